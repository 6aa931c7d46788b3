//! Canonical byte buffer and conversions to backend-native representations.
//!
//! Every public operation takes and returns [`ByteBuffer`]. Backends do not all
//! speak bytes: the software random source yields 32-bit words and the software
//! SHA-1/MD5 digesters report lowercase hex. This module converts losslessly
//! between those representations:
//!
//! - [`WordArray`]: big-endian 32-bit words plus an explicit bit length, so a
//!   trailing partial word never leaks padding bytes back into the buffer
//! - hex: lowercase, two characters per byte
//!
//! `from_backend_format(to_backend_format(b, f)) == b` holds for every buffer and
//! every [`BackendFormat`], including empty buffers and lengths not divisible by 4.

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Immutable, fixed-length sequence of octets.
///
/// Serializes as a lowercase hex string.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteBuffer {
    #[serde(with = "hex::serde")]
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        ByteBuffer { bytes }
    }

    /// Zero-length buffer
    pub fn empty() -> Self {
        ByteBuffer::default()
    }

    /// UTF-8 encode a string into a buffer
    pub fn from_utf8_str(text: &str) -> Self {
        ByteBuffer::new(text.as_bytes().to_vec())
    }

    /// Decode the buffer as UTF-8 text
    pub fn to_utf8_string(&self) -> Result<String, CryptoError> {
        String::from_utf8(self.bytes.clone())
            .map_err(|e| CryptoError::Format(format!("buffer is not valid UTF-8: {}", e)))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        ByteBuffer::new(bytes)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        ByteBuffer::new(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for ByteBuffer {
    fn from(bytes: [u8; N]) -> Self {
        ByteBuffer::new(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for ByteBuffer {
    fn from(bytes: &[u8; N]) -> Self {
        ByteBuffer::new(bytes.to_vec())
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(buffer: ByteBuffer) -> Self {
        buffer.bytes
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteBuffer[{}]({})", self.bytes.len(), to_hex(&self.bytes))
    }
}

/// Lowercase hex encoding, two characters per byte
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decode a hex string (either case) into a buffer
pub fn from_hex(text: &str) -> Result<ByteBuffer, CryptoError> {
    hex::decode(text)
        .map(ByteBuffer::new)
        .map_err(|e| CryptoError::Format(format!("invalid hex string: {}", e)))
}

/// Big-endian 32-bit words with an explicit bit length.
///
/// A trailing partial word holds its bytes in the high-order bits. Words past
/// `bit_length` are ignored on conversion back to bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordArray {
    words: Vec<u32>,
    bit_length: usize,
}

impl WordArray {
    /// Build a word array, checking that `bit_length` is byte-aligned and
    /// covered by `words`.
    pub fn new(words: Vec<u32>, bit_length: usize) -> Result<Self, CryptoError> {
        if bit_length % 8 != 0 {
            return Err(CryptoError::Format(format!(
                "word array bit length {} is not a whole number of bytes",
                bit_length
            )));
        }
        let available = words.len().checked_mul(32).ok_or_else(|| {
            CryptoError::Format("word array too large".into())
        })?;
        if bit_length > available {
            return Err(CryptoError::Format(format!(
                "word array declares {} bits but holds only {}",
                bit_length, available
            )));
        }
        Ok(WordArray { words, bit_length })
    }

    /// Word array whose every bit is significant
    pub fn full(words: Vec<u32>) -> Self {
        let bit_length = words.len() * 32;
        WordArray { words, bit_length }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[..chunk.len()].copy_from_slice(chunk);
                u32::from_be_bytes(word)
            })
            .collect();
        WordArray {
            words,
            bit_length: bytes.len() * 8,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.bit_length / 8;
        let mut out = Vec::with_capacity(len);
        for word in &self.words {
            for byte in word.to_be_bytes() {
                if out.len() == len {
                    return out;
                }
                out.push(byte);
            }
        }
        out
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }
}

/// Representation a backend consumes or produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFormat {
    Bytes,
    Words,
    Hex,
}

/// A value in some backend's native representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendNative {
    Bytes(Vec<u8>),
    Words(WordArray),
    Hex(String),
}

impl BackendNative {
    pub fn format(&self) -> BackendFormat {
        match self {
            BackendNative::Bytes(_) => BackendFormat::Bytes,
            BackendNative::Words(_) => BackendFormat::Words,
            BackendNative::Hex(_) => BackendFormat::Hex,
        }
    }
}

/// Convert a buffer into the representation `format` expects
pub fn to_backend_format(buffer: &ByteBuffer, format: BackendFormat) -> BackendNative {
    match format {
        BackendFormat::Bytes => BackendNative::Bytes(buffer.as_slice().to_vec()),
        BackendFormat::Words => BackendNative::Words(WordArray::from_bytes(buffer)),
        BackendFormat::Hex => BackendNative::Hex(to_hex(buffer)),
    }
}

/// Convert a backend-native value back into a buffer
pub fn from_backend_format(native: BackendNative) -> Result<ByteBuffer, CryptoError> {
    match native {
        BackendNative::Bytes(bytes) => Ok(ByteBuffer::new(bytes)),
        BackendNative::Words(words) => Ok(ByteBuffer::new(words.to_bytes())),
        BackendNative::Hex(text) => from_hex(&text),
    }
}
