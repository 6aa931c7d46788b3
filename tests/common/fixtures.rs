//! Known-answer vectors and shared test data.
//!
//! The AES-GCM vector uses a 6-byte IV, exercising the GHASH-derived counter
//! block that only the software backend implements.

// ============================================================================
// Common Test Data
// ============================================================================

/// Pangram used by every digest and cipher vector
pub const FOX: &str = "The quick brown fox jumps over the lazy dog";

/// Empty data - minimal test case for boundary conditions
pub const EMPTY_DATA: &[u8] = b"";

/// Unicode data - validates UTF-8 handling with emoji and international characters
pub const UNICODE_DATA: &str = "Hello 世界 🚀 Rust";

// ============================================================================
// Digest Vectors
// ============================================================================

pub const FOX_SHA256_HEX: &str = "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592";
pub const FOX_SHA1_HEX: &str = "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12";
pub const FOX_MD5_HEX: &str = "9e107d9d372bb6826bd81d3542a419d6";

/// Digests of the empty message
pub const EMPTY_SHA256_HEX: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
pub const EMPTY_SHA1_HEX: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
pub const EMPTY_MD5_HEX: &str = "d41d8cd98f00b204e9800998ecf8427e";

// ============================================================================
// PBKDF2-HMAC-SHA256 Vector
// ============================================================================

pub const PBKDF2_PASSWORD: [u8; 4] = [1, 2, 3, 4];
pub const PBKDF2_SALT: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
pub const PBKDF2_ITERATIONS: u32 = 5;
pub const PBKDF2_BITS: u32 = 256;
pub const PBKDF2_EXPECTED: [u8; 32] = [
    47, 13, 80, 112, 194, 67, 188, 165, 156, 20, 55, 91, 253, 15, 35, 59, 77, 131, 137, 240, 173,
    119, 14, 158, 165, 101, 159, 21, 181, 212, 111, 137,
];

// ============================================================================
// AES-256-GCM Vector (6-byte IV, 128-bit tag, no additional data)
// ============================================================================

pub const GCM_KEY_HEX: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
pub const GCM_IV_HEX: &str = "9f86d081884c";
pub const GCM_EXPECTED: [u8; 59] = [
    79, 247, 73, 172, 136, 12, 70, 67, 44, 98, 118, 130, 238, 170, 237, 212, 94, 212, 98, 54, 232,
    139, 227, 104, 139, 127, 75, 212, 79, 148, 251, 2, 58, 105, 31, 83, 195, 132, 107, 221, 205,
    52, 81, 118, 77, 227, 75, 194, 96, 138, 191, 143, 86, 40, 127, 232, 99, 207, 81,
];

// ============================================================================
// Key Material
// ============================================================================

/// AES-256 key for roundtrip tests
pub const TEST_KEY_256: [u8; 32] = [
    0x3e, 0x5a, 0x89, 0x7f, 0x2c, 0x1d, 0x4b, 0x91, 0xa2, 0x6f, 0x3c, 0xd4, 0x8e, 0x5b, 0x72, 0x19,
    0xf6, 0x4a, 0x21, 0x98, 0xc7, 0x65, 0x3d, 0xb0, 0x84, 0x59, 0x2e, 0xd1, 0xa6, 0x7b, 0x30, 0xe5,
];

/// AES-128 key for roundtrip tests
pub const TEST_KEY_128: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

/// Standard 96-bit IV
pub const TEST_IV: [u8; 12] = [
    0xca, 0xfe, 0xba, 0xbe, 0xfa, 0xce, 0xdb, 0xad, 0xde, 0xca, 0xf8, 0x88,
];

/// Additional authenticated data for AAD-binding tests
pub const TEST_AAD: &[u8] = b"domain_separation_context";
