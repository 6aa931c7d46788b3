//! # unicrypt-core
//!
//! One async API for random bytes, digests, PBKDF2 and AES-GCM, served by the
//! fastest backend the process can use.
//!
//! Every operation prefers the native backend (`ring`) and transparently falls
//! back to a pure-Rust software backend when the native facility is absent,
//! cannot serve the requested parameters, or fails at runtime. Callers see the
//! same bytes either way.
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |:--------|:------------|:-------:|
//! | `native` | `ring` backend (AES-NI / ARMv8 crypto when present) | Yes |
//!
//! Setting `UNICRYPT_DISABLE_NATIVE=1` forces the software backend at runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unicrypt_core::{ByteBuffer, CryptOptions, DigestOptions, Hash};
//!
//! # async fn run() -> Result<(), unicrypt_core::CryptoError> {
//! let data = ByteBuffer::from_utf8_str("Hello, unicrypt!");
//!
//! // SHA-256 unless another hash is requested
//! let sha256 = unicrypt_core::digest(data.clone(), DigestOptions::new()).await?;
//! let md5 = unicrypt_core::digest(data.clone(), DigestOptions::new().with_hash(Hash::Md5)).await?;
//! assert_eq!((sha256.len(), md5.len()), (32, 16));
//!
//! // AES-256-GCM with a fresh key and IV
//! let key = unicrypt_core::random_bytes(32).await?;
//! let iv = unicrypt_core::random_bytes(unicrypt_core::IV_LENGTH).await?;
//! let sealed =
//!     unicrypt_core::encrypt(key.clone(), iv.clone(), data.clone(), CryptOptions::new()).await?;
//! let opened = unicrypt_core::decrypt(key, iv, sealed, CryptOptions::new()).await?;
//! assert_eq!(opened, data);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Derivation
//!
//! ```rust,no_run
//! use unicrypt_core::DeriveOptions;
//!
//! # async fn run() -> Result<(), unicrypt_core::CryptoError> {
//! let salt = unicrypt_core::random_bytes(unicrypt_core::SALT_LENGTH).await?;
//! let key = unicrypt_core::derive(
//!     b"correct horse battery staple",
//!     salt,
//!     DeriveOptions::new().with_iterations(100_000),
//! )
//! .await?;
//! assert_eq!(key.len(), 32);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Properties
//!
//! - **AES-GCM**: authenticated encryption; tampered input never yields plaintext
//! - **Truncated tags**: verified in constant time via `subtle`
//! - **Memory safety**: `zeroize` for key copies held by the software backend

// Errors shared by every operation
pub mod error;
pub use error::CryptoError;

// Byte buffers and backend representations
pub mod buffer;
pub use buffer::{ByteBuffer, from_hex, to_hex};

// Native facility detection
pub mod capability;
pub use capability::{
    CapabilityProbe, FixedCapabilities, SystemCapabilities, has_native_crypto,
    has_native_secure_random,
};

// Option records and normalization
pub mod options;
pub use options::{
    CryptCypher, CryptMode, CryptOptions, DerivationAlgorithm, DeriveOptions, DigestOptions,
    Hash,
};

// Backends and their registry
pub mod backend;
pub use backend::{Backend, BackendKind, BackendRegistry};

// Metrics and observability
pub mod metrics;
pub use metrics::{OperationFamily, OperationMetrics};

// Fallback dispatch
pub mod dispatch;
pub use dispatch::{DispatchState, Dispatched};

// Facade
pub mod provider;
pub use provider::{CryptoProvider, CryptoProviderBuilder, CryptoRequest};

/// Recommended salt length in bytes
pub const SALT_LENGTH: usize = 16;

/// Recommended AES-GCM IV length in bytes
pub const IV_LENGTH: usize = 12;

/// Recommended AES-GCM tag length in bits
pub const TAG_LENGTH: u32 = 128;

/// Exactly `length` cryptographically random bytes from the default provider
pub async fn random_bytes(length: usize) -> Result<ByteBuffer, CryptoError> {
    CryptoProvider::global().random_bytes(length).await
}

/// Digest `data` with the default provider
pub async fn digest(
    data: impl Into<ByteBuffer>,
    options: DigestOptions,
) -> Result<ByteBuffer, CryptoError> {
    CryptoProvider::global().digest(data, options).await
}

/// Derive key material from `password` and `salt` with the default provider
pub async fn derive(
    password: impl Into<ByteBuffer>,
    salt: impl Into<ByteBuffer>,
    options: DeriveOptions,
) -> Result<ByteBuffer, CryptoError> {
    CryptoProvider::global().derive(password, salt, options).await
}

/// Encrypt `data` with the default provider
pub async fn encrypt(
    key: impl Into<ByteBuffer>,
    iv: impl Into<ByteBuffer>,
    data: impl Into<ByteBuffer>,
    options: CryptOptions,
) -> Result<ByteBuffer, CryptoError> {
    CryptoProvider::global().encrypt(key, iv, data, options).await
}

/// Decrypt `data` with the default provider
pub async fn decrypt(
    key: impl Into<ByteBuffer>,
    iv: impl Into<ByteBuffer>,
    data: impl Into<ByteBuffer>,
    options: CryptOptions,
) -> Result<ByteBuffer, CryptoError> {
    CryptoProvider::global().decrypt(key, iv, data, options).await
}

/// Run a request on the default provider, reporting how it was served
pub async fn execute(request: CryptoRequest) -> Result<Dispatched<ByteBuffer>, CryptoError> {
    CryptoProvider::global().execute(request).await
}
