//! Portable pure-Rust backend.
//!
//! Always available. Covers every combination the public surface accepts:
//! SHA-1, SHA-256 and MD5 digests, PBKDF2-HMAC, and AES-128/192/256-GCM with
//! IVs of 1 to 16 bytes and any of the NIST GCM tag sizes.
//!
//! Some results are reported in the representation the underlying routine
//! naturally produces (hex for SHA-1/MD5, big-endian words for random output)
//! and normalized by the dispatcher.

use super::{Backend, BackendKind, Cipher, Deriver, Digester, RandomSource};
use crate::buffer::{BackendNative, WordArray};
use crate::error::CryptoError;
use crate::options::{CryptDirection, CryptParams, DeriveParams, DigestParams, Hash};
use aes_gcm::AesGcm;
use aes_gcm::aead::consts::{
    U1, U2, U3, U4, U5, U6, U7, U8, U9, U10, U11, U12, U13, U14, U15, U16,
};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use async_trait::async_trait;
use rand::RngCore;
use sha2::Digest;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// GCM tag sizes in bits (NIST SP 800-38D section 5.2.1.2)
pub const GCM_TAG_LENGTHS: [u32; 7] = [32, 64, 96, 104, 112, 120, 128];

/// Largest IV the software cipher is instantiated for
pub const MAX_IV_LENGTH: usize = 16;

fn failure(reason: impl Into<String>) -> CryptoError {
    CryptoError::backend_failure(BackendKind::Software, reason)
}

/// Instantiate `AesGcm` for the runtime key and IV sizes and call `$func`
/// with it as the cipher type parameter.
macro_rules! with_aes_gcm {
    (@iv $aes:ty, $iv_len:expr, $func:ident($($arg:expr),*)) => {
        match $iv_len {
            1 => $func::<AesGcm<$aes, U1>>($($arg),*),
            2 => $func::<AesGcm<$aes, U2>>($($arg),*),
            3 => $func::<AesGcm<$aes, U3>>($($arg),*),
            4 => $func::<AesGcm<$aes, U4>>($($arg),*),
            5 => $func::<AesGcm<$aes, U5>>($($arg),*),
            6 => $func::<AesGcm<$aes, U6>>($($arg),*),
            7 => $func::<AesGcm<$aes, U7>>($($arg),*),
            8 => $func::<AesGcm<$aes, U8>>($($arg),*),
            9 => $func::<AesGcm<$aes, U9>>($($arg),*),
            10 => $func::<AesGcm<$aes, U10>>($($arg),*),
            11 => $func::<AesGcm<$aes, U11>>($($arg),*),
            12 => $func::<AesGcm<$aes, U12>>($($arg),*),
            13 => $func::<AesGcm<$aes, U13>>($($arg),*),
            14 => $func::<AesGcm<$aes, U14>>($($arg),*),
            15 => $func::<AesGcm<$aes, U15>>($($arg),*),
            16 => $func::<AesGcm<$aes, U16>>($($arg),*),
            other => Err(failure(format!("{}-byte IV unavailable", other))),
        }
    };
    ($key_len:expr, $iv_len:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $key_len {
            16 => with_aes_gcm!(@iv Aes128, $iv_len, $func($($arg),*)),
            24 => with_aes_gcm!(@iv Aes192, $iv_len, $func($($arg),*)),
            32 => with_aes_gcm!(@iv Aes256, $iv_len, $func($($arg),*)),
            other => Err(failure(format!("{}-byte AES key unavailable", other))),
        }
    };
}

fn init_cipher<A: AeadInPlace + KeyInit>(
    key: &[u8],
    iv: &[u8],
) -> Result<(A, GenericArray<u8, <A as AeadCore>::NonceSize>), CryptoError> {
    let cipher = A::new_from_slice(key).map_err(|_| failure("invalid key length"))?;
    if iv.len() != <<A as AeadCore>::NonceSize as Unsigned>::USIZE {
        return Err(failure(format!("{}-byte IV does not match cipher", iv.len())));
    }
    let nonce = GenericArray::clone_from_slice(iv);
    Ok((cipher, nonce))
}

/// `ciphertext || tag[..tag_len]`
fn seal<A: AeadInPlace + KeyInit>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    data: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>, CryptoError> {
    let (cipher, nonce) = init_cipher::<A>(key, iv)?;

    let mut buffer = Vec::with_capacity(data.len() + tag_len);
    buffer.extend_from_slice(data);
    let tag = cipher
        .encrypt_in_place_detached(&nonce, aad, &mut buffer)
        .map_err(|_| failure("AES-GCM encryption failed"))?;

    let tag = tag
        .get(..tag_len)
        .ok_or_else(|| failure(format!("{}-byte tag exceeds GCM tag size", tag_len)))?;
    buffer.extend_from_slice(tag);
    Ok(buffer)
}

fn open<A: AeadInPlace + KeyInit>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    data: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>, CryptoError> {
    let (cipher, nonce) = init_cipher::<A>(key, iv)?;
    let body_len = data
        .len()
        .checked_sub(tag_len)
        .ok_or_else(|| failure("ciphertext shorter than tag"))?;
    let (body, tag) = data.split_at(body_len);

    if tag_len == <<A as AeadCore>::TagSize as Unsigned>::USIZE {
        let mut plaintext = body.to_vec();
        cipher
            .decrypt_in_place_detached(&nonce, aad, &mut plaintext, GenericArray::from_slice(tag))
            .map_err(|_| CryptoError::AuthenticationFailed)?;
        return Ok(plaintext);
    }

    // Truncated tag: GCM encryption and decryption share the CTR keystream, so
    // sealing the ciphertext yields the plaintext. Sealing that plaintext again
    // reproduces the ciphertext together with its full tag.
    let mut plaintext = Zeroizing::new(body.to_vec());
    cipher
        .encrypt_in_place_detached(&nonce, aad, &mut plaintext)
        .map_err(|_| failure("AES-GCM keystream failed"))?;

    let mut recomputed = Zeroizing::new(plaintext.to_vec());
    let full_tag = cipher
        .encrypt_in_place_detached(&nonce, aad, &mut recomputed)
        .map_err(|_| failure("AES-GCM tag computation failed"))?;

    let expected = full_tag
        .get(..tag_len)
        .ok_or_else(|| failure(format!("{}-byte tag exceeds GCM tag size", tag_len)))?;
    if bool::from(expected.ct_eq(tag)) {
        Ok(plaintext.to_vec())
    } else {
        Err(CryptoError::AuthenticationFailed)
    }
}

fn random_words(length: usize) -> Vec<u32> {
    let mut rng = rand::rng();
    (0..length / 4 + 1).map(|_| rng.next_u32()).collect()
}

/// Pure-Rust implementation of every operation family
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareBackend;

impl SoftwareBackend {
    pub fn new() -> Self {
        SoftwareBackend
    }
}

#[async_trait]
impl RandomSource for SoftwareBackend {
    async fn random_bytes(&self, length: usize) -> Result<BackendNative, CryptoError> {
        // One spare word, sliced back to `length` by the bit length
        let words = random_words(length);
        let bit_length = length
            .checked_mul(8)
            .ok_or_else(|| failure("random length overflows"))?;
        let words = WordArray::new(words, bit_length).map_err(|e| failure(e.to_string()))?;
        Ok(BackendNative::Words(words))
    }
}

#[async_trait]
impl Digester for SoftwareBackend {
    fn supports_digest(&self, _params: &DigestParams) -> bool {
        true
    }

    async fn digest(
        &self,
        data: &[u8],
        params: &DigestParams,
    ) -> Result<BackendNative, CryptoError> {
        let out = match params.hash {
            Hash::Sha256 => BackendNative::Bytes(sha2::Sha256::digest(data).to_vec()),
            Hash::Sha1 => BackendNative::Hex(hex::encode(sha1::Sha1::digest(data))),
            Hash::Md5 => BackendNative::Hex(hex::encode(md5::Md5::digest(data))),
        };
        Ok(out)
    }
}

#[async_trait]
impl Deriver for SoftwareBackend {
    fn supports_derive(&self, params: &DeriveParams) -> bool {
        matches!(params.hash, Hash::Sha1 | Hash::Sha256)
    }

    async fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &DeriveParams,
    ) -> Result<BackendNative, CryptoError> {
        let mut out = vec![0u8; params.output_len()];
        let rounds = params.iterations.get();
        match params.hash {
            Hash::Sha256 => pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, rounds, &mut out),
            Hash::Sha1 => pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, rounds, &mut out),
            Hash::Md5 => return Err(failure("PBKDF2 with MD5 unavailable")),
        }
        Ok(BackendNative::Bytes(out))
    }
}

#[async_trait]
impl Cipher for SoftwareBackend {
    fn supports_crypt(&self, key_len: usize, iv_len: usize, params: &CryptParams) -> bool {
        crate::options::AES_KEY_LENGTHS.contains(&key_len)
            && (1..=MAX_IV_LENGTH).contains(&iv_len)
            && GCM_TAG_LENGTHS.contains(&params.tag_length)
    }

    async fn crypt(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        params: &CryptParams,
    ) -> Result<BackendNative, CryptoError> {
        if !GCM_TAG_LENGTHS.contains(&params.tag_length) {
            return Err(failure(format!("{}-bit tags unavailable", params.tag_length)));
        }
        let key = Zeroizing::new(key.to_vec());
        let aad = params.additional_data.as_slice();
        let tag_len = params.tag_len();

        let out = match params.direction {
            CryptDirection::Encrypt => {
                with_aes_gcm!(key.len(), iv.len(), seal(&key, iv, aad, data, tag_len))?
            }
            CryptDirection::Decrypt => {
                with_aes_gcm!(key.len(), iv.len(), open(&key, iv, aad, data, tag_len))?
            }
        };
        Ok(BackendNative::Bytes(out))
    }
}

impl Backend for SoftwareBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn name(&self) -> &'static str {
        "rust-crypto"
    }
}
