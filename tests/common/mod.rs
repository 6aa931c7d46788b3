//! Common test utilities and fixtures for the unicrypt-core test suite.
//!
//! Shared known-answer vectors, provider constructors and scripted backends used
//! by the integration and property-based tests.

#![allow(dead_code)]

pub mod backends;
pub mod fixtures;

use unicrypt_core::{BackendKind, BackendRegistry, CryptoProvider, FixedCapabilities};

/// Route `log` output to the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Provider that never considers a native backend
pub fn software_provider() -> CryptoProvider {
    CryptoProvider::builder()
        .capabilities(FixedCapabilities::software_only())
        .build()
}

/// Provider whose native candidate always fails with a recoverable error
pub fn failing_native_provider() -> CryptoProvider {
    let registry = BackendRegistry::new()
        .with_backend(BackendKind::Native, backends::FailingBackend::shared)
        .with_backend(BackendKind::Software, backends::software);

    CryptoProvider::builder()
        .capabilities(FixedCapabilities::all())
        .registry(registry)
        .build()
}

/// Provider backed by the real native backend only when it is compiled in
#[cfg(feature = "native")]
pub fn native_provider() -> CryptoProvider {
    CryptoProvider::builder()
        .capabilities(FixedCapabilities::all())
        .build()
}

/// Drive a future to completion on a fresh current-thread runtime
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build test runtime")
        .block_on(future)
}
