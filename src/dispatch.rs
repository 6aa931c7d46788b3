//! Backend selection and native-to-software fallback.
//!
//! Every call walks the registry in priority order:
//!
//! ```text
//! TryPreferred ──ok──────────────────────────────> Succeeded
//!      │ recoverable failure
//!      v
//! TryFallback(0) ──ok──> Succeeded
//!      │ recoverable failure, more candidates
//!      v
//! TryFallback(n) ──no candidates left──> Exhausted
//! ```
//!
//! A native candidate is considered only when the capability probe reports the
//! facility and the backend supports the concrete parameters. Recoverable
//! failures are logged and discarded; the caller sees the result of the first
//! successful candidate or the error of the last one. Authentication failures
//! and inconsistent output end the call immediately.
//!
//! Each call starts again from `TryPreferred`: a failure never demotes a
//! backend for later calls.

use crate::backend::{Backend, BackendKind, BackendRegistry};
use crate::buffer::{BackendNative, ByteBuffer, from_backend_format};
use crate::capability::CapabilityProbe;
use crate::error::CryptoError;
use crate::metrics::{OperationFamily, OperationMetrics};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Position of a call in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// The first eligible candidate is being tried
    TryPreferred,
    /// The preferred candidate failed; `n` counts earlier fallback failures
    TryFallback(usize),
    Succeeded,
    Exhausted,
}

/// Output of a successful dispatch together with its metrics
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched<T> {
    pub output: T,
    pub metrics: OperationMetrics,
}

impl<T> Dispatched<T> {
    pub fn into_output(self) -> T {
        self.output
    }
}

/// Lazily-evaluated candidate list for one call.
///
/// Candidates are filtered and constructed only as the chain advances, so a
/// software backend is never built when the native one succeeds.
pub struct FallbackChain<'a> {
    family: OperationFamily,
    registry: &'a BackendRegistry,
    native_available: bool,
    cursor: usize,
    state: DispatchState,
    attempts: usize,
    last_error: Option<CryptoError>,
}

impl<'a> FallbackChain<'a> {
    pub fn new(
        family: OperationFamily,
        registry: &'a BackendRegistry,
        probe: &dyn CapabilityProbe,
    ) -> Self {
        let native_available = if family.needs_secure_random() {
            probe.has_native_secure_random()
        } else {
            probe.has_native_crypto()
        };

        FallbackChain {
            family,
            registry,
            native_available,
            cursor: 0,
            state: DispatchState::TryPreferred,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Backend invocations handed out so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Next eligible candidate, or `None` once the registry is exhausted or the
    /// chain has reached a terminal state.
    pub fn next_candidate<F>(&mut self, supports: F) -> Option<Arc<dyn Backend>>
    where
        F: Fn(&dyn Backend) -> bool,
    {
        if matches!(self.state, DispatchState::Succeeded | DispatchState::Exhausted) {
            return None;
        }

        while self.cursor < self.registry.len() {
            let index = self.cursor;
            self.cursor += 1;

            let kind = self.registry.kind_at(index)?;
            if kind == BackendKind::Native && !self.native_available {
                log::debug!("{}: native facility absent, skipping candidate", self.family);
                continue;
            }

            let backend = self.registry.instance(index)?;
            if supports(backend.as_ref()) {
                self.attempts += 1;
                return Some(backend);
            }
            log::debug!(
                "{}: {} backend ({}) does not support these parameters",
                self.family,
                kind,
                backend.name()
            );
        }
        None
    }

    pub fn record_success(&mut self) {
        self.state = DispatchState::Succeeded;
    }

    /// Record a failed attempt.
    ///
    /// Recoverable errors are logged and kept as the candidate for the final
    /// error. Anything else terminates the chain and is handed back.
    pub fn record_failure(
        &mut self,
        backend: &dyn Backend,
        error: CryptoError,
    ) -> Result<(), CryptoError> {
        if !error.is_recoverable() {
            self.state = DispatchState::Exhausted;
            return Err(error);
        }

        log::warn!(
            "{} via {} backend ({}) failed: {}",
            self.family,
            backend.kind(),
            backend.name(),
            error
        );
        self.state = match self.state {
            DispatchState::TryPreferred => DispatchState::TryFallback(0),
            DispatchState::TryFallback(n) => DispatchState::TryFallback(n + 1),
            terminal => terminal,
        };
        self.last_error = Some(error);
        Ok(())
    }

    /// Terminal error once no candidate is left
    pub fn exhaust(&mut self) -> CryptoError {
        self.state = DispatchState::Exhausted;
        match self.last_error.take() {
            Some(last) => CryptoError::Exhausted {
                attempts: self.attempts,
                last: Box::new(last),
            },
            None => CryptoError::NotImplemented(format!(
                "no backend supports the requested {} parameters",
                self.family
            )),
        }
    }
}

/// One request bound to its inputs, performable by any backend.
///
/// Futures returned by [`Operation::attempt`] are boxed and `Send`, so a
/// dispatched call can be spawned onto a multi-threaded runtime.
#[async_trait]
pub(crate) trait Operation: Send + Sync {
    type Output: Send;

    fn family(&self) -> OperationFamily;

    /// Whether `backend` can serve these concrete parameters
    fn supported_by(&self, backend: &dyn Backend) -> bool;

    /// Perform the operation on one backend, including output adaptation and
    /// post-condition checks
    async fn attempt(&self, backend: &dyn Backend) -> Result<Self::Output, CryptoError>;
}

/// Drive a fallback chain for `operation` to completion
pub(crate) async fn run<O: Operation>(
    operation: &O,
    registry: &BackendRegistry,
    probe: &dyn CapabilityProbe,
) -> Result<Dispatched<O::Output>, CryptoError> {
    let family = operation.family();
    let started = Instant::now();
    let mut chain = FallbackChain::new(family, registry, probe);

    while let Some(backend) = chain.next_candidate(|candidate| operation.supported_by(candidate)) {
        log::debug!(
            "{}: trying {} backend ({})",
            family,
            backend.kind(),
            backend.name()
        );

        match operation.attempt(backend.as_ref()).await {
            Ok(output) => {
                chain.record_success();
                let kind = backend.kind();
                let elapsed_micros = started.elapsed().as_micros() as u64;
                let hardware_accelerated = kind == BackendKind::Native
                    && matches!(family, OperationFamily::Encrypt | OperationFamily::Decrypt)
                    && probe.hardware_aes();
                let metrics = OperationMetrics::new()
                    .with_dispatch(family, kind, chain.attempts() as u32)
                    .with_timing(elapsed_micros, hardware_accelerated);
                return Ok(Dispatched { output, metrics });
            }
            Err(error) => chain.record_failure(backend.as_ref(), error)?,
        }
    }

    Err(chain.exhaust())
}

/// Normalize a backend result into a buffer and check its length.
///
/// Conversion errors and length mismatches mean the backend broke its
/// contract; both surface as [`CryptoError::BackendInconsistency`].
pub(crate) fn adapt_output(
    backend: &dyn Backend,
    native: BackendNative,
    expected_len: usize,
) -> Result<ByteBuffer, CryptoError> {
    let kind = backend.kind();
    let buffer = from_backend_format(native)
        .map_err(|e| CryptoError::inconsistency(kind, e.to_string()))?;

    if buffer.len() != expected_len {
        return Err(CryptoError::inconsistency(
            kind,
            format!(
                "expected {} output bytes, got {}",
                expected_len,
                buffer.len()
            ),
        ));
    }
    Ok(buffer)
}
