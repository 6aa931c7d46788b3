//! Scripted backends for exercising dispatch behavior through the public API.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use unicrypt_core::CryptoError;
use unicrypt_core::backend::software::SoftwareBackend;
use unicrypt_core::backend::{Backend, BackendKind, Cipher, Deriver, Digester, RandomSource};
use unicrypt_core::buffer::BackendNative;
use unicrypt_core::options::{CryptParams, DeriveParams, DigestParams};

/// Factory for the real software backend
pub fn software() -> Arc<dyn Backend> {
    Arc::new(SoftwareBackend::new())
}

/// Native stand-in whose every operation fails with a recoverable error
#[derive(Debug, Default)]
pub struct FailingBackend;

impl FailingBackend {
    pub fn shared() -> Arc<dyn Backend> {
        Arc::new(FailingBackend)
    }

    fn fail() -> Result<BackendNative, CryptoError> {
        Err(CryptoError::BackendFailure {
            backend: BackendKind::Native,
            reason: "simulated native failure".into(),
        })
    }
}

#[async_trait]
impl RandomSource for FailingBackend {
    async fn random_bytes(&self, _length: usize) -> Result<BackendNative, CryptoError> {
        Self::fail()
    }
}

#[async_trait]
impl Digester for FailingBackend {
    fn supports_digest(&self, _params: &DigestParams) -> bool {
        true
    }

    async fn digest(
        &self,
        _data: &[u8],
        _params: &DigestParams,
    ) -> Result<BackendNative, CryptoError> {
        Self::fail()
    }
}

#[async_trait]
impl Deriver for FailingBackend {
    fn supports_derive(&self, _params: &DeriveParams) -> bool {
        true
    }

    async fn derive(
        &self,
        _password: &[u8],
        _salt: &[u8],
        _params: &DeriveParams,
    ) -> Result<BackendNative, CryptoError> {
        Self::fail()
    }
}

#[async_trait]
impl Cipher for FailingBackend {
    fn supports_crypt(&self, _key_len: usize, _iv_len: usize, _params: &CryptParams) -> bool {
        true
    }

    async fn crypt(
        &self,
        _key: &[u8],
        _iv: &[u8],
        _data: &[u8],
        _params: &CryptParams,
    ) -> Result<BackendNative, CryptoError> {
        Self::fail()
    }
}

impl Backend for FailingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// What a [`ProxyBackend`] does with the software result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Pass results through untouched
    None,
    /// Drop the last output byte
    Truncate,
}

/// Software backend wrapper that counts invocations and can corrupt output
#[derive(Debug)]
pub struct ProxyBackend {
    kind: BackendKind,
    inner: SoftwareBackend,
    calls: Arc<AtomicUsize>,
    mutation: Mutation,
}

impl ProxyBackend {
    pub fn new(kind: BackendKind, calls: Arc<AtomicUsize>, mutation: Mutation) -> Self {
        ProxyBackend {
            kind,
            inner: SoftwareBackend::new(),
            calls,
            mutation,
        }
    }

    fn apply(
        &self,
        result: Result<BackendNative, CryptoError>,
    ) -> Result<BackendNative, CryptoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let native = result?;
        match self.mutation {
            Mutation::None => Ok(native),
            Mutation::Truncate => {
                let mut bytes = unicrypt_core::buffer::from_backend_format(native)?.into_vec();
                bytes.pop();
                Ok(BackendNative::Bytes(bytes))
            }
        }
    }
}

#[async_trait]
impl RandomSource for ProxyBackend {
    async fn random_bytes(&self, length: usize) -> Result<BackendNative, CryptoError> {
        self.apply(self.inner.random_bytes(length).await)
    }
}

#[async_trait]
impl Digester for ProxyBackend {
    fn supports_digest(&self, params: &DigestParams) -> bool {
        self.inner.supports_digest(params)
    }

    async fn digest(
        &self,
        data: &[u8],
        params: &DigestParams,
    ) -> Result<BackendNative, CryptoError> {
        self.apply(self.inner.digest(data, params).await)
    }
}

#[async_trait]
impl Deriver for ProxyBackend {
    fn supports_derive(&self, params: &DeriveParams) -> bool {
        self.inner.supports_derive(params)
    }

    async fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &DeriveParams,
    ) -> Result<BackendNative, CryptoError> {
        self.apply(self.inner.derive(password, salt, params).await)
    }
}

#[async_trait]
impl Cipher for ProxyBackend {
    fn supports_crypt(&self, key_len: usize, iv_len: usize, params: &CryptParams) -> bool {
        self.inner.supports_crypt(key_len, iv_len, params)
    }

    async fn crypt(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        params: &CryptParams,
    ) -> Result<BackendNative, CryptoError> {
        self.apply(self.inner.crypt(key, iv, data, params).await)
    }
}

impl Backend for ProxyBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}
