//! Observability metrics for dispatched operations
//!
//! Records which backend served a call, how many candidates were tried and how
//! long the whole dispatch took. Returned alongside the output by
//! [`CryptoProvider::execute`](crate::CryptoProvider::execute).

use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation family a call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationFamily {
    RandomBytes,
    Digest,
    Derive,
    Encrypt,
    Decrypt,
}

impl OperationFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationFamily::RandomBytes => "randomBytes",
            OperationFamily::Digest => "digest",
            OperationFamily::Derive => "derive",
            OperationFamily::Encrypt => "encrypt",
            OperationFamily::Decrypt => "decrypt",
        }
    }

    /// Random generation has its own capability flag; every other family uses
    /// the general native crypto flag.
    pub fn needs_secure_random(&self) -> bool {
        matches!(self, OperationFamily::RandomBytes)
    }
}

impl fmt::Display for OperationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation metrics for visibility into backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    /// Family of the operation (None before dispatch)
    pub family: Option<OperationFamily>,

    /// Backend that produced the result (None if no candidate succeeded)
    pub backend: Option<BackendKind>,

    /// Number of backend invocations, including the successful one
    pub attempts: u32,

    /// Failed attempts that were discarded in favor of the next candidate
    pub fallbacks: u32,

    /// Wall-clock time of the dispatch in microseconds
    pub elapsed_micros: u64,

    /// Whether the serving backend had AES instructions available
    pub hardware_accelerated: bool,
}

impl OperationMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        OperationMetrics {
            family: None,
            backend: None,
            attempts: 0,
            fallbacks: 0,
            elapsed_micros: 0,
            hardware_accelerated: false,
        }
    }

    /// Set the dispatch outcome
    pub fn with_dispatch(
        mut self,
        family: OperationFamily,
        backend: BackendKind,
        attempts: u32,
    ) -> Self {
        self.family = Some(family);
        self.backend = Some(backend);
        self.attempts = attempts;
        self.fallbacks = attempts.saturating_sub(1);
        self
    }

    /// Set timing metrics
    pub fn with_timing(mut self, time_micros: u64, hw_accel: bool) -> Self {
        self.elapsed_micros = time_micros;
        self.hardware_accelerated = hw_accel;
        self
    }

    /// Whether the result came from a fallback candidate
    pub fn fell_back(&self) -> bool {
        self.fallbacks > 0
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
