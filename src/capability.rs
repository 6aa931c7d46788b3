//! Process-wide detection of native crypto facilities.
//!
//! The probe runs at most once per process and its result is never invalidated:
//! environment capability does not change at runtime. Concurrent first use is
//! safe, every caller observes the same fully-initialized [`Capabilities`].
//!
//! Absence of a facility is a normal outcome, never an error.

use std::ffi::OsStr;
use std::fmt::Debug;
use std::sync::OnceLock;

/// Environment variable that forces the software path when set to anything
/// other than empty or `0`.
pub const DISABLE_NATIVE_ENV: &str = "UNICRYPT_DISABLE_NATIVE";

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

// CPU feature detection
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use std::arch::is_x86_feature_detected;

/// Snapshot of what the current process can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Native digest, derivation and AEAD facility is compiled in and passed its self-test
    pub native_crypto: bool,
    /// Native system entropy source is available
    pub native_secure_random: bool,
    /// CPU exposes AES instructions (informational only)
    pub hardware_aes: bool,
}

impl Capabilities {
    /// Memoized capability flags for this process
    pub fn detect() -> &'static Capabilities {
        CAPABILITIES.get_or_init(|| {
            let caps = Self::probe();
            log::info!(
                "crypto capabilities: native_crypto={} native_secure_random={} hardware_aes={}",
                caps.native_crypto,
                caps.native_secure_random,
                caps.hardware_aes
            );
            caps
        })
    }

    fn probe() -> Self {
        let override_value = std::env::var_os(DISABLE_NATIVE_ENV);
        Self::probe_with(disables_native(override_value.as_deref()))
    }

    fn probe_with(native_disabled: bool) -> Self {
        let hardware_aes = detect_hardware_acceleration();
        if native_disabled {
            log::debug!("{} set, native facilities disabled", DISABLE_NATIVE_ENV);
            return Capabilities {
                native_crypto: false,
                native_secure_random: false,
                hardware_aes,
            };
        }

        Capabilities {
            native_crypto: probe_native_crypto(),
            native_secure_random: probe_native_secure_random(),
            hardware_aes,
        }
    }
}

/// Whether a [`DISABLE_NATIVE_ENV`] value turns the native path off
fn disables_native(value: Option<&OsStr>) -> bool {
    match value {
        Some(value) => !value.is_empty() && value != "0",
        None => false,
    }
}

#[cfg(feature = "native")]
fn probe_native_crypto() -> bool {
    // SHA-256("abc"), FIPS 180-2 appendix B.1
    const EXPECTED: [u8; 4] = [0xba, 0x78, 0x16, 0xbf];
    let out = ring::digest::digest(&ring::digest::SHA256, b"abc");
    out.as_ref().starts_with(&EXPECTED)
}

#[cfg(not(feature = "native"))]
fn probe_native_crypto() -> bool {
    false
}

#[cfg(feature = "native")]
fn probe_native_secure_random() -> bool {
    use ring::rand::SecureRandom;

    let mut probe = [0u8; 1];
    ring::rand::SystemRandom::new().fill(&mut probe).is_ok()
}

#[cfg(not(feature = "native"))]
fn probe_native_secure_random() -> bool {
    false
}

/// Detect hardware AES support
///
/// Informational only: ring selects its fastest implementation on its own.
fn detect_hardware_acceleration() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        #[cfg(target_feature = "aes")]
        return true;

        #[cfg(not(target_feature = "aes"))]
        {
            is_x86_feature_detected!("aes")
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("aes")
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    false
}

/// Whether a native crypto facility is usable in this process
pub fn has_native_crypto() -> bool {
    Capabilities::detect().native_crypto
}

/// Whether a native secure random source is usable in this process
pub fn has_native_secure_random() -> bool {
    Capabilities::detect().native_secure_random
}

/// Capability query injected into the dispatcher
pub trait CapabilityProbe: Send + Sync + Debug {
    fn has_native_crypto(&self) -> bool;

    fn has_native_secure_random(&self) -> bool;

    fn hardware_aes(&self) -> bool {
        false
    }
}

/// Probe backed by the memoized process-wide detection
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCapabilities;

impl CapabilityProbe for SystemCapabilities {
    fn has_native_crypto(&self) -> bool {
        has_native_crypto()
    }

    fn has_native_secure_random(&self) -> bool {
        has_native_secure_random()
    }

    fn hardware_aes(&self) -> bool {
        Capabilities::detect().hardware_aes
    }
}

/// Probe with fixed answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCapabilities {
    pub native_crypto: bool,
    pub native_secure_random: bool,
}

impl FixedCapabilities {
    /// Everything native is reported available
    pub fn all() -> Self {
        FixedCapabilities {
            native_crypto: true,
            native_secure_random: true,
        }
    }

    /// Nothing native is reported available
    pub fn software_only() -> Self {
        FixedCapabilities {
            native_crypto: false,
            native_secure_random: false,
        }
    }
}

impl CapabilityProbe for FixedCapabilities {
    fn has_native_crypto(&self) -> bool {
        self.native_crypto
    }

    fn has_native_secure_random(&self) -> bool {
        self.native_secure_random
    }
}
