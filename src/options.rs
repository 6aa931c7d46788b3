//! Option records and their normalization.
//!
//! Each operation family accepts a partial option record. Normalization injects
//! defaults for unset fields and rejects unrecognized values with
//! [`CryptoError::InvalidOption`] before any backend is touched.
//!
//! Enumerated fields are carried as strings until normalization so records can be
//! loaded from configuration (JSON, TOML) and still report unknown values by field
//! name. The `with_*` builders set them from the typed enums.

use crate::buffer::ByteBuffer;
use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Default derived key size in bits
pub const DEFAULT_DERIVE_BITS: u32 = 256;

/// Hash functions usable with `digest` and `derive`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hash {
    /// 160 bits, 20 bytes
    Sha1,
    /// 256 bits, 32 bytes
    Sha256,
    /// 128 bits, 16 bytes. No native backend serves MD5.
    Md5,
}

impl Hash {
    pub const ALL: [Hash; 3] = [Hash::Sha1, Hash::Sha256, Hash::Md5];

    /// Digest length in bytes
    pub fn output_len(&self) -> usize {
        match self {
            Hash::Sha1 => 20,
            Hash::Sha256 => 32,
            Hash::Md5 => 16,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hash::Sha1 => "SHA-1",
            Hash::Sha256 => "SHA-256",
            Hash::Md5 => "MD5",
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" | "SHA-1" => Ok(Hash::Sha1),
            "SHA256" | "SHA-256" => Ok(Hash::Sha256),
            "MD5" => Ok(Hash::Md5),
            _ => Err(CryptoError::invalid_option(
                "hash",
                format!("unknown hash function `{}`", s),
            )),
        }
    }
}

/// Key derivation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivationAlgorithm {
    Pbkdf2,
}

impl DerivationAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivationAlgorithm::Pbkdf2 => "PBKDF2",
        }
    }
}

impl fmt::Display for DerivationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivationAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("PBKDF2") {
            Ok(DerivationAlgorithm::Pbkdf2)
        } else {
            Err(CryptoError::invalid_option(
                "algorithm",
                format!("unknown derivation algorithm `{}`", s),
            ))
        }
    }
}

/// Block ciphers usable with `encrypt` and `decrypt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptCypher {
    Aes,
}

impl CryptCypher {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptCypher::Aes => "AES",
        }
    }
}

impl fmt::Display for CryptCypher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptCypher {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("AES") {
            Ok(CryptCypher::Aes)
        } else {
            Err(CryptoError::invalid_option(
                "cypher",
                format!("unknown cypher `{}`", s),
            ))
        }
    }
}

/// Cipher modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptMode {
    Gcm,
}

impl CryptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptMode::Gcm => "GCM",
        }
    }
}

impl fmt::Display for CryptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GCM") {
            Ok(CryptMode::Gcm)
        } else {
            Err(CryptoError::invalid_option(
                "mode",
                format!("unknown cypher mode `{}`", s),
            ))
        }
    }
}

/// Direction of a crypt call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptDirection {
    Encrypt,
    Decrypt,
}

impl fmt::Display for CryptDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptDirection::Encrypt => f.write_str("encrypt"),
            CryptDirection::Decrypt => f.write_str("decrypt"),
        }
    }
}

// ============================================================================
// Partial option records
// ============================================================================

/// Options for `digest`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DigestOptions {
    /// Hash function, default SHA-256
    pub hash: Option<String>,
}

impl DigestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash(mut self, hash: Hash) -> Self {
        self.hash = Some(hash.as_str().to_string());
        self
    }
}

/// Options for `derive`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DeriveOptions {
    /// Derivation algorithm, default PBKDF2
    pub algorithm: Option<String>,
    /// Hash function of the PRF, default SHA-256
    pub hash: Option<String>,
    /// Iteration count, default 1000
    pub iterations: Option<i64>,
    /// Output size in bits, default 256
    pub bits: Option<i64>,
}

impl DeriveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: DerivationAlgorithm) -> Self {
        self.algorithm = Some(algorithm.as_str().to_string());
        self
    }

    pub fn with_hash(mut self, hash: Hash) -> Self {
        self.hash = Some(hash.as_str().to_string());
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(i64::from(iterations));
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(i64::from(bits));
        self
    }
}

/// Options for `encrypt` and `decrypt`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CryptOptions {
    /// Block cipher, default AES
    pub cypher: Option<String>,
    /// Cipher mode, default GCM
    pub mode: Option<String>,
    /// Additional authenticated data, default empty
    pub additional_data: Option<ByteBuffer>,
    /// Authentication tag length in bits, default 128
    pub tag_length: Option<i64>,
}

impl CryptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cypher(mut self, cypher: CryptCypher) -> Self {
        self.cypher = Some(cypher.as_str().to_string());
        self
    }

    pub fn with_mode(mut self, mode: CryptMode) -> Self {
        self.mode = Some(mode.as_str().to_string());
        self
    }

    pub fn with_additional_data(mut self, additional_data: impl Into<ByteBuffer>) -> Self {
        self.additional_data = Some(additional_data.into());
        self
    }

    pub fn with_tag_length(mut self, tag_length: u32) -> Self {
        self.tag_length = Some(i64::from(tag_length));
        self
    }
}

// ============================================================================
// Normalized parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestParams {
    pub hash: Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveParams {
    pub algorithm: DerivationAlgorithm,
    pub hash: Hash,
    pub iterations: NonZeroU32,
    pub bits: u32,
}

impl DeriveParams {
    /// Output length in bytes
    pub fn output_len(&self) -> usize {
        (self.bits / 8) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptParams {
    pub cypher: CryptCypher,
    pub mode: CryptMode,
    pub direction: CryptDirection,
    pub additional_data: ByteBuffer,
    pub tag_length: u32,
}

impl CryptParams {
    /// Tag length in bytes
    pub fn tag_len(&self) -> usize {
        (self.tag_length / 8) as usize
    }
}

fn parse_or<T>(value: Option<&str>, default: T) -> Result<T, CryptoError>
where
    T: FromStr<Err = CryptoError>,
{
    match value {
        Some(v) => v.parse(),
        None => Ok(default),
    }
}

fn positive_u32(
    field: &'static str,
    value: Option<i64>,
    default: u32,
) -> Result<u32, CryptoError> {
    match value {
        None => Ok(default),
        Some(v) if v <= 0 => Err(CryptoError::invalid_option(
            field,
            format!("must be greater than 0, got {}", v),
        )),
        Some(v) => u32::try_from(v)
            .map_err(|_| CryptoError::invalid_option(field, format!("{} is out of range", v))),
    }
}

pub fn normalize_digest(options: &DigestOptions) -> Result<DigestParams, CryptoError> {
    let hash = parse_or(options.hash.as_deref(), Hash::Sha256)?;
    Ok(DigestParams { hash })
}

pub fn normalize_derive(options: &DeriveOptions) -> Result<DeriveParams, CryptoError> {
    let algorithm = parse_or(options.algorithm.as_deref(), DerivationAlgorithm::Pbkdf2)?;

    let hash = parse_or(options.hash.as_deref(), Hash::Sha256)?;
    if hash != Hash::Sha256 {
        return Err(CryptoError::NotImplemented(format!(
            "{} key derivation with {}",
            algorithm, hash
        )));
    }

    let iterations = positive_u32("iterations", options.iterations, DEFAULT_ITERATIONS)?;
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| CryptoError::invalid_option("iterations", "must be greater than 0"))?;

    let bits = positive_u32("bits", options.bits, DEFAULT_DERIVE_BITS)?;
    if bits % 8 != 0 {
        return Err(CryptoError::invalid_option(
            "bits",
            format!("must be a multiple of 8, got {}", bits),
        ));
    }

    Ok(DeriveParams {
        algorithm,
        hash,
        iterations,
        bits,
    })
}

pub fn normalize_crypt(
    options: &CryptOptions,
    direction: CryptDirection,
) -> Result<CryptParams, CryptoError> {
    let cypher = parse_or(options.cypher.as_deref(), CryptCypher::Aes)?;
    let mode = parse_or(options.mode.as_deref(), CryptMode::Gcm)?;
    let additional_data = options.additional_data.clone().unwrap_or_default();
    let tag_length = positive_u32("tagLength", options.tag_length, crate::TAG_LENGTH)?;

    Ok(CryptParams {
        cypher,
        mode,
        direction,
        additional_data,
        tag_length,
    })
}

// ============================================================================
// Buffer argument validation
// ============================================================================

/// AES key sizes in bytes
pub const AES_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

pub fn validate_random_length(length: usize) -> Result<(), CryptoError> {
    if length == 0 {
        return Err(CryptoError::invalid_parameter(
            "length",
            "must be a positive number of bytes",
        ));
    }
    Ok(())
}

pub fn validate_crypt_buffers(
    key: &ByteBuffer,
    iv: &ByteBuffer,
    data: &ByteBuffer,
    params: &CryptParams,
) -> Result<(), CryptoError> {
    if !AES_KEY_LENGTHS.contains(&key.len()) {
        return Err(CryptoError::invalid_parameter(
            "key",
            format!("AES keys are 16, 24 or 32 bytes, got {}", key.len()),
        ));
    }
    if iv.is_empty() {
        return Err(CryptoError::invalid_parameter("iv", "must not be empty"));
    }
    if params.direction == CryptDirection::Decrypt && data.len() < params.tag_len() {
        return Err(CryptoError::invalid_parameter(
            "data",
            format!(
                "ciphertext of {} bytes is shorter than the {}-bit tag",
                data.len(),
                params.tag_length
            ),
        ));
    }
    Ok(())
}
