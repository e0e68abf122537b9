//! Capability detection and backend selection.
//!
//! The vector backend is chosen once per process, the first time any
//! operation asks for it: the widest family the CPU supports, optionally
//! capped by [`KernelConfig`]. After that, "vectorized" is a yes/no choice
//! at every call site.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::{debug, warn};

use crate::backend::MatrixBackend;
use crate::config::{BackendPreference, KernelConfig, BACKEND_ENV};
use crate::error::KernelError;
use crate::scalar::ScalarBackend;

/// Instruction-set families a backend exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Scalar,
    /// 128-bit SSE, x86 / x86_64.
    Sse,
    /// 256-bit AVX with FMA, x86 / x86_64.
    Avx,
    /// 128-bit NEON, aarch64.
    Neon,
}

impl Capability {
    /// Widest family the running CPU supports.
    pub fn detect() -> Self {
        detect_capability()
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Scalar => "scalar",
            Capability::Sse => "sse",
            Capability::Avx => "avx",
            Capability::Neon => "neon",
        }
    }

    /// Returns true if this family can run on the current CPU.
    pub fn is_supported(self) -> bool {
        self == Capability::Scalar || self.backend().is_some()
    }

    /// Instantiate the vector backend for this family.
    ///
    /// Returns `None` for `Scalar` and for families the CPU lacks.
    pub fn backend(self) -> Option<Box<dyn MatrixBackend>> {
        match self {
            Capability::Scalar => None,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Capability::Sse => crate::simd::SseBackend::detect()
                .map(|b| Box::new(b) as Box<dyn MatrixBackend>),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Capability::Avx => crate::simd::AvxBackend::detect()
                .map(|b| Box::new(b) as Box<dyn MatrixBackend>),
            #[cfg(target_arch = "aarch64")]
            Capability::Neon => crate::simd::NeonBackend::detect()
                .map(|b| Box::new(b) as Box<dyn MatrixBackend>),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Capability::Scalar),
            "sse" => Ok(Capability::Sse),
            "avx" => Ok(Capability::Avx),
            "neon" => Ok(Capability::Neon),
            other => Err(KernelError::UnknownBackend(other.to_string())),
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_capability() -> Capability {
    if crate::simd::AvxBackend::detect().is_some() {
        Capability::Avx
    } else if crate::simd::SseBackend::detect().is_some() {
        Capability::Sse
    } else {
        Capability::Scalar
    }
}

#[cfg(target_arch = "aarch64")]
fn detect_capability() -> Capability {
    if crate::simd::NeonBackend::detect().is_some() {
        Capability::Neon
    } else {
        Capability::Scalar
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn detect_capability() -> Capability {
    Capability::Scalar
}

/// The outcome of backend selection.
#[derive(Debug)]
pub struct Selection {
    pub capability: Capability,
    pub backend: Option<Box<dyn MatrixBackend>>,
}

/// Pick the vector backend for `config` on the current CPU.
pub fn select(config: &KernelConfig) -> Selection {
    let detected = Capability::detect();
    let capability = match config.backend {
        BackendPreference::Auto => detected,
        BackendPreference::Force(c) if c.is_supported() => c,
        BackendPreference::Force(c) => {
            warn!(
                "{}={} is not supported on this CPU, using {}",
                BACKEND_ENV, c, detected
            );
            detected
        }
    };
    debug!(
        "matrix kernels: detected {}, vector path uses {}",
        detected, capability
    );
    Selection {
        capability,
        backend: capability.backend(),
    }
}

static SCALAR: ScalarBackend = ScalarBackend::new();
static SELECTION: OnceLock<Selection> = OnceLock::new();

fn selection() -> &'static Selection {
    SELECTION.get_or_init(|| select(&KernelConfig::from_env()))
}

/// The scalar reference backend.
pub fn scalar_backend() -> &'static ScalarBackend {
    &SCALAR
}

/// The vector backend selected for this process, if any.
pub fn vector_backend() -> Option<&'static dyn MatrixBackend> {
    selection().backend.as_deref()
}

/// The family the vector path runs on (`Scalar` when there is none).
pub fn capability() -> Capability {
    selection().capability
}

/// Backend an operation runs on for the given vectorization request.
pub fn backend_for(use_vector: bool) -> &'static dyn MatrixBackend {
    match (use_vector, vector_backend()) {
        (true, Some(backend)) => backend,
        _ => scalar_backend(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capability() {
        assert_eq!("sse".parse::<Capability>().unwrap(), Capability::Sse);
        assert_eq!("NEON".parse::<Capability>().unwrap(), Capability::Neon);
        let err = "mmx".parse::<Capability>().unwrap_err();
        assert_eq!(err.to_string(), "unknown backend: mmx");
    }

    #[test]
    fn test_detected_is_supported() {
        let c = Capability::detect();
        assert!(c.is_supported());
        assert_eq!(c.backend().is_some(), c != Capability::Scalar);
    }

    #[test]
    fn test_scalar_request_disables_vector_path() {
        let config = KernelConfig {
            backend: BackendPreference::Force(Capability::Scalar),
        };
        let sel = select(&config);
        assert_eq!(sel.capability, Capability::Scalar);
        assert!(sel.backend.is_none());
    }

    #[test]
    fn test_unsupported_request_falls_back_to_detected() {
        #[cfg(target_arch = "aarch64")]
        let foreign = Capability::Avx;
        #[cfg(not(target_arch = "aarch64"))]
        let foreign = Capability::Neon;

        let sel = select(&KernelConfig {
            backend: BackendPreference::Force(foreign),
        });
        assert_eq!(sel.capability, Capability::detect());
    }

    #[test]
    fn test_selected_backend_name_matches_capability() {
        let sel = select(&KernelConfig::default());
        match sel.backend {
            Some(b) => assert_eq!(b.name(), sel.capability.name()),
            None => assert_eq!(sel.capability, Capability::Scalar),
        }
    }

    #[test]
    fn test_backend_for() {
        assert_eq!(backend_for(false).name(), "scalar");
        assert_eq!(backend_for(true).name(), capability().name());
    }
}
