//! Error type shared by every operation family.

use crate::backend::BackendKind;
use thiserror::Error;

/// Errors that can occur while validating, dispatching or executing an operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// An option was set to a value outside its recognized enumeration or range
    #[error("invalid option `{field}`: {reason}")]
    InvalidOption { field: &'static str, reason: String },

    /// A buffer-typed argument has a shape the operation cannot accept
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// No backend is able to service the requested combination
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A backend-native representation could not be converted to a byte buffer
    #[error("buffer format error: {0}")]
    Format(String),

    /// A single backend attempt failed; the dispatcher may recover from this
    #[error("{backend} backend failed: {reason}")]
    BackendFailure { backend: BackendKind, reason: String },

    /// A backend violated an output post-condition
    #[error("{backend} backend produced inconsistent output: {reason}")]
    BackendInconsistency { backend: BackendKind, reason: String },

    /// Authentication tag verification failed during decryption
    #[error("authentication tag verification failed")]
    AuthenticationFailed,

    /// Every candidate backend failed; `last` is the error of the final attempt
    #[error("all {attempts} backend candidate(s) failed, last error: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<CryptoError>,
    },
}

impl CryptoError {
    pub(crate) fn invalid_option(field: &'static str, reason: impl Into<String>) -> Self {
        CryptoError::InvalidOption {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        CryptoError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn backend_failure(backend: BackendKind, reason: impl Into<String>) -> Self {
        CryptoError::BackendFailure {
            backend,
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistency(backend: BackendKind, reason: impl Into<String>) -> Self {
        CryptoError::BackendInconsistency {
            backend,
            reason: reason.into(),
        }
    }

    /// Whether the dispatcher may discard this error and try the next candidate.
    ///
    /// Only plain backend failures qualify. Inconsistent output and failed
    /// authentication indicate a correctness problem and are always surfaced.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CryptoError::BackendFailure { .. })
    }

    /// The error that ended the fallback chain, unwrapping `Exhausted`.
    pub fn root_cause(&self) -> &CryptoError {
        match self {
            CryptoError::Exhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }
}
