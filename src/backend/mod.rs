//! Backend interfaces and the lazily-populated backend registry.
//!
//! A backend services one or more operation families through the family traits
//! [`RandomSource`], [`Digester`], [`Deriver`] and [`Cipher`]. Backends return
//! values in their own representation ([`BackendNative`]); the dispatcher runs
//! them through the buffer adapter and checks output post-conditions.
//!
//! # Available Backends
//!
//! - [`native`]: `ring` (assembly implementations, AES-NI / ARMv8 crypto when present)
//! - [`software`]: pure Rust (`sha2`, `sha1`, `md-5`, `pbkdf2`, `aes-gcm`, `rand`)

#[cfg(feature = "native")]
pub mod native;
pub mod software;

use crate::buffer::BackendNative;
use crate::error::CryptoError;
use crate::options::{CryptParams, DeriveParams, DigestParams};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Implementation class of a backend.
///
/// Ordering is fallback priority: native candidates always precede software ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Platform or assembly-accelerated facility
    Native,
    /// Portable pure-software implementation
    Software,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => f.write_str("native"),
            BackendKind::Software => f.write_str("software"),
        }
    }
}

/// Source of cryptographically strong random bytes
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// Produce exactly `length` random bytes
    async fn random_bytes(&self, length: usize) -> Result<BackendNative, CryptoError>;
}

/// Message digest
#[async_trait]
pub trait Digester: Send + Sync {
    fn supports_digest(&self, params: &DigestParams) -> bool;

    async fn digest(
        &self,
        data: &[u8],
        params: &DigestParams,
    ) -> Result<BackendNative, CryptoError>;
}

/// Password-based key derivation
#[async_trait]
pub trait Deriver: Send + Sync {
    fn supports_derive(&self, params: &DeriveParams) -> bool;

    async fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &DeriveParams,
    ) -> Result<BackendNative, CryptoError>;
}

/// Authenticated symmetric encryption
///
/// Ciphertext layout is `ciphertext || tag`, the tag truncated to
/// `params.tag_length` bits.
#[async_trait]
pub trait Cipher: Send + Sync {
    fn supports_crypt(&self, key_len: usize, iv_len: usize, params: &CryptParams) -> bool;

    async fn crypt(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        params: &CryptParams,
    ) -> Result<BackendNative, CryptoError>;
}

/// A backend servicing every operation family
pub trait Backend: RandomSource + Digester + Deriver + Cipher + fmt::Debug {
    fn kind(&self) -> BackendKind;

    fn name(&self) -> &'static str;
}

type BackendFactory = Box<dyn Fn() -> Arc<dyn Backend> + Send + Sync>;

struct BackendSlot {
    kind: BackendKind,
    factory: BackendFactory,
    instance: OnceLock<Arc<dyn Backend>>,
}

/// Ordered backend candidates, each constructed on first use.
///
/// Construction cost is paid at most once per slot. Slots stay sorted by
/// [`BackendKind`] so native candidates precede software ones; slots of the same
/// kind keep registration order.
pub struct BackendRegistry {
    slots: Vec<BackendSlot>,
}

impl BackendRegistry {
    /// Registry without any backend
    pub fn new() -> Self {
        BackendRegistry { slots: Vec::new() }
    }

    /// Native backend (when compiled in) followed by the software backend
    pub fn with_defaults() -> Self {
        let registry = BackendRegistry::new();
        #[cfg(feature = "native")]
        let registry = registry.with_backend(BackendKind::Native, || {
            Arc::new(native::NativeBackend::new()) as Arc<dyn Backend>
        });
        registry.with_backend(BackendKind::Software, || {
            Arc::new(software::SoftwareBackend::new()) as Arc<dyn Backend>
        })
    }

    /// Add a candidate whose instance is built by `factory` on first use
    pub fn with_backend<F>(mut self, kind: BackendKind, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Backend> + Send + Sync + 'static,
    {
        self.slots.push(BackendSlot {
            kind,
            factory: Box::new(factory),
            instance: OnceLock::new(),
        });
        self.slots.sort_by_key(|slot| slot.kind);
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Kind of the candidate at `index`
    pub fn kind_at(&self, index: usize) -> Option<BackendKind> {
        self.slots.get(index).map(|slot| slot.kind)
    }

    /// Instance of the candidate at `index`, constructing it on first request
    pub fn instance(&self, index: usize) -> Option<Arc<dyn Backend>> {
        let slot = self.slots.get(index)?;
        let instance = slot.instance.get_or_init(|| {
            log::debug!("loading {} backend", slot.kind);
            (slot.factory)()
        });
        Some(Arc::clone(instance))
    }

    /// Whether any candidate of `kind` has been constructed yet
    pub fn is_loaded(&self, kind: BackendKind) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.kind == kind && slot.instance.get().is_some())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .map(|slot| (slot.kind, slot.instance.get().is_some())),
            )
            .finish()
    }
}
