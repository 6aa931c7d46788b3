//! Public facade: one entry point per operation family.
//!
//! Each call normalizes its options, validates buffer shapes and only then
//! hands the request to the dispatcher. Invalid input never reaches a backend.

use crate::backend::{Backend, BackendRegistry};
use crate::buffer::ByteBuffer;
use crate::capability::{CapabilityProbe, SystemCapabilities};
use crate::dispatch::{self, Dispatched, Operation, adapt_output};
use crate::error::CryptoError;
use crate::metrics::OperationFamily;
use crate::options::{
    CryptDirection, CryptOptions, CryptParams, DeriveOptions, DeriveParams, DigestOptions,
    DigestParams, normalize_crypt, normalize_derive, normalize_digest, validate_crypt_buffers,
    validate_random_length,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};

static DEFAULT_PROVIDER: LazyLock<CryptoProvider> = LazyLock::new(CryptoProvider::new);

/// A single operation request, as accepted by [`CryptoProvider::execute`].
///
/// Deserializable from JSON with an `operation` tag, buffers as hex:
///
/// ```json
/// { "operation": "digest", "data": "616263", "options": { "hash": "SHA-1" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum CryptoRequest {
    RandomBytes {
        length: usize,
    },
    Digest {
        data: ByteBuffer,
        #[serde(default)]
        options: DigestOptions,
    },
    Derive {
        password: ByteBuffer,
        salt: ByteBuffer,
        #[serde(default)]
        options: DeriveOptions,
    },
    Encrypt {
        key: ByteBuffer,
        iv: ByteBuffer,
        data: ByteBuffer,
        #[serde(default)]
        options: CryptOptions,
    },
    Decrypt {
        key: ByteBuffer,
        iv: ByteBuffer,
        data: ByteBuffer,
        #[serde(default)]
        options: CryptOptions,
    },
}

impl CryptoRequest {
    pub fn family(&self) -> OperationFamily {
        match self {
            CryptoRequest::RandomBytes { .. } => OperationFamily::RandomBytes,
            CryptoRequest::Digest { .. } => OperationFamily::Digest,
            CryptoRequest::Derive { .. } => OperationFamily::Derive,
            CryptoRequest::Encrypt { .. } => OperationFamily::Encrypt,
            CryptoRequest::Decrypt { .. } => OperationFamily::Decrypt,
        }
    }
}

/// Crypto facade bound to a capability probe and a backend registry.
///
/// Cheap to share: all state is read-only after construction apart from the
/// registry's one-time backend initialization.
pub struct CryptoProvider {
    capabilities: Arc<dyn CapabilityProbe>,
    registry: BackendRegistry,
}

impl CryptoProvider {
    /// Provider using process-wide capability detection and the default backends
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Process-wide default provider, created on first use
    pub fn global() -> &'static CryptoProvider {
        &DEFAULT_PROVIDER
    }

    pub fn builder() -> CryptoProviderBuilder {
        CryptoProviderBuilder::default()
    }

    pub fn capabilities(&self) -> &dyn CapabilityProbe {
        self.capabilities.as_ref()
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run one request and report how it was served
    pub async fn execute(
        &self,
        request: CryptoRequest,
    ) -> Result<Dispatched<ByteBuffer>, CryptoError> {
        match request {
            CryptoRequest::RandomBytes { length } => self.dispatch_random(length).await,
            CryptoRequest::Digest { data, options } => self.dispatch_digest(&data, &options).await,
            CryptoRequest::Derive {
                password,
                salt,
                options,
            } => self.dispatch_derive(&password, &salt, &options).await,
            CryptoRequest::Encrypt {
                key,
                iv,
                data,
                options,
            } => {
                self.dispatch_crypt(&key, &iv, &data, &options, CryptDirection::Encrypt)
                    .await
            }
            CryptoRequest::Decrypt {
                key,
                iv,
                data,
                options,
            } => {
                self.dispatch_crypt(&key, &iv, &data, &options, CryptDirection::Decrypt)
                    .await
            }
        }
    }

    /// Exactly `length` cryptographically random bytes
    pub async fn random_bytes(&self, length: usize) -> Result<ByteBuffer, CryptoError> {
        self.dispatch_random(length).await.map(Dispatched::into_output)
    }

    /// Message digest of `data`; SHA-256 unless `options.hash` says otherwise
    pub async fn digest(
        &self,
        data: impl Into<ByteBuffer>,
        options: DigestOptions,
    ) -> Result<ByteBuffer, CryptoError> {
        self.dispatch_digest(&data.into(), &options)
            .await
            .map(Dispatched::into_output)
    }

    /// PBKDF2 key derivation producing `bits / 8` bytes
    pub async fn derive(
        &self,
        password: impl Into<ByteBuffer>,
        salt: impl Into<ByteBuffer>,
        options: DeriveOptions,
    ) -> Result<ByteBuffer, CryptoError> {
        self.dispatch_derive(&password.into(), &salt.into(), &options)
            .await
            .map(Dispatched::into_output)
    }

    /// AES-GCM encryption; output is `ciphertext || tag`
    pub async fn encrypt(
        &self,
        key: impl Into<ByteBuffer>,
        iv: impl Into<ByteBuffer>,
        data: impl Into<ByteBuffer>,
        options: CryptOptions,
    ) -> Result<ByteBuffer, CryptoError> {
        self.dispatch_crypt(
            &key.into(),
            &iv.into(),
            &data.into(),
            &options,
            CryptDirection::Encrypt,
        )
        .await
        .map(Dispatched::into_output)
    }

    /// AES-GCM decryption of `ciphertext || tag`
    pub async fn decrypt(
        &self,
        key: impl Into<ByteBuffer>,
        iv: impl Into<ByteBuffer>,
        data: impl Into<ByteBuffer>,
        options: CryptOptions,
    ) -> Result<ByteBuffer, CryptoError> {
        self.dispatch_crypt(
            &key.into(),
            &iv.into(),
            &data.into(),
            &options,
            CryptDirection::Decrypt,
        )
        .await
        .map(Dispatched::into_output)
    }

    async fn dispatch_random(&self, length: usize) -> Result<Dispatched<ByteBuffer>, CryptoError> {
        validate_random_length(length)?;

        dispatch::run(&RandomCall { length }, &self.registry, self.capabilities()).await
    }

    async fn dispatch_digest(
        &self,
        data: &ByteBuffer,
        options: &DigestOptions,
    ) -> Result<Dispatched<ByteBuffer>, CryptoError> {
        let call = DigestCall {
            data: data.as_slice(),
            params: normalize_digest(options)?,
        };

        dispatch::run(&call, &self.registry, self.capabilities()).await
    }

    async fn dispatch_derive(
        &self,
        password: &ByteBuffer,
        salt: &ByteBuffer,
        options: &DeriveOptions,
    ) -> Result<Dispatched<ByteBuffer>, CryptoError> {
        let call = DeriveCall {
            password: password.as_slice(),
            salt: salt.as_slice(),
            params: normalize_derive(options)?,
        };

        dispatch::run(&call, &self.registry, self.capabilities()).await
    }

    async fn dispatch_crypt(
        &self,
        key: &ByteBuffer,
        iv: &ByteBuffer,
        data: &ByteBuffer,
        options: &CryptOptions,
        direction: CryptDirection,
    ) -> Result<Dispatched<ByteBuffer>, CryptoError> {
        let params = normalize_crypt(options, direction)?;
        validate_crypt_buffers(key, iv, data, &params)?;

        let expected = match direction {
            CryptDirection::Encrypt => data.len() + params.tag_len(),
            CryptDirection::Decrypt => data.len() - params.tag_len(),
        };
        let call = CryptCall {
            key: key.as_slice(),
            iv: iv.as_slice(),
            data: data.as_slice(),
            params,
            expected,
        };

        dispatch::run(&call, &self.registry, self.capabilities()).await
    }
}

struct RandomCall {
    length: usize,
}

#[async_trait]
impl Operation for RandomCall {
    type Output = ByteBuffer;

    fn family(&self) -> OperationFamily {
        OperationFamily::RandomBytes
    }

    fn supported_by(&self, _backend: &dyn Backend) -> bool {
        true
    }

    async fn attempt(&self, backend: &dyn Backend) -> Result<ByteBuffer, CryptoError> {
        let native = backend.random_bytes(self.length).await?;
        adapt_output(backend, native, self.length)
    }
}

struct DigestCall<'a> {
    data: &'a [u8],
    params: DigestParams,
}

#[async_trait]
impl<'a> Operation for DigestCall<'a> {
    type Output = ByteBuffer;

    fn family(&self) -> OperationFamily {
        OperationFamily::Digest
    }

    fn supported_by(&self, backend: &dyn Backend) -> bool {
        backend.supports_digest(&self.params)
    }

    async fn attempt(&self, backend: &dyn Backend) -> Result<ByteBuffer, CryptoError> {
        let native = backend.digest(self.data, &self.params).await?;
        adapt_output(backend, native, self.params.hash.output_len())
    }
}

struct DeriveCall<'a> {
    password: &'a [u8],
    salt: &'a [u8],
    params: DeriveParams,
}

#[async_trait]
impl<'a> Operation for DeriveCall<'a> {
    type Output = ByteBuffer;

    fn family(&self) -> OperationFamily {
        OperationFamily::Derive
    }

    fn supported_by(&self, backend: &dyn Backend) -> bool {
        backend.supports_derive(&self.params)
    }

    async fn attempt(&self, backend: &dyn Backend) -> Result<ByteBuffer, CryptoError> {
        let native = backend
            .derive(self.password, self.salt, &self.params)
            .await?;
        adapt_output(backend, native, self.params.output_len())
    }
}

/// AES-GCM in either direction; `expected` is the output length after the
/// tag is appended or stripped
struct CryptCall<'a> {
    key: &'a [u8],
    iv: &'a [u8],
    data: &'a [u8],
    params: CryptParams,
    expected: usize,
}

#[async_trait]
impl<'a> Operation for CryptCall<'a> {
    type Output = ByteBuffer;

    fn family(&self) -> OperationFamily {
        match self.params.direction {
            CryptDirection::Encrypt => OperationFamily::Encrypt,
            CryptDirection::Decrypt => OperationFamily::Decrypt,
        }
    }

    fn supported_by(&self, backend: &dyn Backend) -> bool {
        backend.supports_crypt(self.key.len(), self.iv.len(), &self.params)
    }

    async fn attempt(&self, backend: &dyn Backend) -> Result<ByteBuffer, CryptoError> {
        let native = backend
            .crypt(self.key, self.iv, self.data, &self.params)
            .await?;
        adapt_output(backend, native, self.expected)
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("capabilities", &self.capabilities)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`CryptoProvider`]
#[derive(Default)]
pub struct CryptoProviderBuilder {
    capabilities: Option<Arc<dyn CapabilityProbe>>,
    registry: Option<BackendRegistry>,
}

impl CryptoProviderBuilder {
    /// Replace the capability probe (defaults to [`SystemCapabilities`])
    pub fn capabilities(mut self, probe: impl CapabilityProbe + 'static) -> Self {
        self.capabilities = Some(Arc::new(probe));
        self
    }

    /// Replace the backend registry (defaults to [`BackendRegistry::with_defaults`])
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> CryptoProvider {
        CryptoProvider {
            capabilities: self
                .capabilities
                .unwrap_or_else(|| Arc::new(SystemCapabilities)),
            registry: self.registry.unwrap_or_default(),
        }
    }
}
