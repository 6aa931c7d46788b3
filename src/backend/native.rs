//! Native backend built on `ring`.
//!
//! ring ships assembly implementations and picks AES-NI / ARMv8 crypto
//! extensions at runtime. It covers SHA-1 and SHA-256 digests, PBKDF2 and
//! AES-128/256-GCM with a 96-bit IV and a full 128-bit tag. Everything else
//! (MD5, AES-192, other IV or tag sizes) is left to the software backend.

use super::{Backend, BackendKind, Cipher, Deriver, Digester, RandomSource};
use crate::buffer::BackendNative;
use crate::error::CryptoError;
use crate::options::{CryptDirection, CryptParams, DeriveParams, DigestParams, Hash};
use async_trait::async_trait;
use ring::{
    aead::{AES_128_GCM, AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey},
    digest, pbkdf2,
    rand::{SecureRandom, SystemRandom},
};
use std::fmt;

/// Full-length GCM tag, the only size ring produces
const NATIVE_TAG_BITS: u32 = 128;

fn failure(reason: impl Into<String>) -> CryptoError {
    CryptoError::backend_failure(BackendKind::Native, reason)
}

/// ring-backed implementation of every operation family
pub struct NativeBackend {
    rng: SystemRandom,
}

impl NativeBackend {
    pub fn new() -> Self {
        NativeBackend {
            rng: SystemRandom::new(),
        }
    }

    fn digest_algorithm(hash: Hash) -> Option<&'static digest::Algorithm> {
        match hash {
            Hash::Sha1 => Some(&digest::SHA1_FOR_LEGACY_USE_ONLY),
            Hash::Sha256 => Some(&digest::SHA256),
            Hash::Md5 => None,
        }
    }

    fn pbkdf2_algorithm(hash: Hash) -> Option<pbkdf2::Algorithm> {
        match hash {
            Hash::Sha1 => Some(pbkdf2::PBKDF2_HMAC_SHA1),
            Hash::Sha256 => Some(pbkdf2::PBKDF2_HMAC_SHA256),
            Hash::Md5 => None,
        }
    }

    fn aead_algorithm(key_len: usize) -> Option<&'static ring::aead::Algorithm> {
        match key_len {
            16 => Some(&AES_128_GCM),
            32 => Some(&AES_256_GCM),
            _ => None,
        }
    }

    fn seal(
        key: &LessSafeKey,
        nonce: Nonce,
        aad: &[u8],
        data: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut ciphertext = Vec::with_capacity(data.len() + key.algorithm().tag_len());
        ciphertext.extend_from_slice(data);

        key.seal_in_place_append_tag(nonce, Aad::from(aad), &mut ciphertext)
            .map_err(|e| failure(format!("AES-GCM encryption failed: {:?}", e)))?;

        Ok(ciphertext)
    }

    fn open(
        key: &LessSafeKey,
        nonce: Nonce,
        aad: &[u8],
        data: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut plaintext = Vec::from(data);

        // ring does not distinguish a bad tag from other open errors; the
        // inputs were validated beforehand so a failure here is a bad tag
        let decrypted_len = key
            .open_in_place(nonce, Aad::from(aad), &mut plaintext)
            .map_err(|_| CryptoError::AuthenticationFailed)?
            .len();

        plaintext.truncate(decrypted_len);
        Ok(plaintext)
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NativeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl RandomSource for NativeBackend {
    async fn random_bytes(&self, length: usize) -> Result<BackendNative, CryptoError> {
        let mut out = vec![0u8; length];
        self.rng
            .fill(&mut out)
            .map_err(|_| failure("system random source unavailable"))?;
        Ok(BackendNative::Bytes(out))
    }
}

#[async_trait]
impl Digester for NativeBackend {
    fn supports_digest(&self, params: &DigestParams) -> bool {
        Self::digest_algorithm(params.hash).is_some()
    }

    async fn digest(
        &self,
        data: &[u8],
        params: &DigestParams,
    ) -> Result<BackendNative, CryptoError> {
        let algorithm = Self::digest_algorithm(params.hash)
            .ok_or_else(|| failure(format!("{} digest unavailable", params.hash)))?;
        let out = digest::digest(algorithm, data);
        Ok(BackendNative::Bytes(out.as_ref().to_vec()))
    }
}

#[async_trait]
impl Deriver for NativeBackend {
    fn supports_derive(&self, params: &DeriveParams) -> bool {
        Self::pbkdf2_algorithm(params.hash).is_some()
    }

    async fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &DeriveParams,
    ) -> Result<BackendNative, CryptoError> {
        let algorithm = Self::pbkdf2_algorithm(params.hash)
            .ok_or_else(|| failure(format!("PBKDF2 with {} unavailable", params.hash)))?;
        if params.output_len() == 0 {
            return Err(failure("PBKDF2 output must not be empty"));
        }

        let mut out = vec![0u8; params.output_len()];
        pbkdf2::derive(algorithm, params.iterations, salt, password, &mut out);
        Ok(BackendNative::Bytes(out))
    }
}

#[async_trait]
impl Cipher for NativeBackend {
    fn supports_crypt(&self, key_len: usize, iv_len: usize, params: &CryptParams) -> bool {
        Self::aead_algorithm(key_len).is_some()
            && iv_len == NONCE_LEN
            && params.tag_length == NATIVE_TAG_BITS
    }

    async fn crypt(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        params: &CryptParams,
    ) -> Result<BackendNative, CryptoError> {
        if params.tag_length != NATIVE_TAG_BITS {
            return Err(failure(format!(
                "{}-bit tags unavailable",
                params.tag_length
            )));
        }
        let algorithm = Self::aead_algorithm(key.len())
            .ok_or_else(|| failure(format!("{}-byte AES key unavailable", key.len())))?;

        let unbound_key = UnboundKey::new(algorithm, key).map_err(|_| failure("invalid key"))?;
        let aead_key = LessSafeKey::new(unbound_key);
        let nonce = Nonce::try_assume_unique_for_key(iv)
            .map_err(|_| failure(format!("{}-byte IV unavailable", iv.len())))?;
        let aad = params.additional_data.as_slice();

        let out = match params.direction {
            CryptDirection::Encrypt => Self::seal(&aead_key, nonce, aad, data)?,
            CryptDirection::Decrypt => Self::open(&aead_key, nonce, aad, data)?,
        };
        Ok(BackendNative::Bytes(out))
    }
}

impl Backend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn name(&self) -> &'static str {
        "ring"
    }
}
