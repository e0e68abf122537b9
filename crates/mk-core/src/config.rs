use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::dispatch::Capability;
use crate::error::KernelError;

/// Environment variable that caps or forces the vector backend.
///
/// Accepted values: `auto`, `scalar`, `sse`, `avx`, `neon` (case-insensitive).
pub const BACKEND_ENV: &str = "MK_BACKEND";

/// Which vector family the dispatcher should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Widest family the CPU supports.
    #[default]
    Auto,
    /// A specific family; `Capability::Scalar` disables the vector path.
    Force(Capability),
}

impl FromStr for BackendPreference {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            return Ok(BackendPreference::Auto);
        }
        s.parse().map(BackendPreference::Force)
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPreference::Auto => write!(f, "auto"),
            BackendPreference::Force(c) => write!(f, "{}", c),
        }
    }
}

/// Kernel configuration, read once when the vector backend is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelConfig {
    pub backend: BackendPreference,
}

impl KernelConfig {
    /// Read the configuration from [`BACKEND_ENV`].
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(BACKEND_ENV).ok().as_deref())
    }

    /// Build a configuration from the raw value of [`BACKEND_ENV`].
    ///
    /// An unparsable value is logged and treated as `auto`.
    pub fn from_value(value: Option<&str>) -> Self {
        let backend = match value.map(str::parse::<BackendPreference>) {
            None => BackendPreference::Auto,
            Some(Ok(pref)) => pref,
            Some(Err(e)) => {
                warn!("ignoring {}: {}", BACKEND_ENV, e);
                BackendPreference::Auto
            }
        };
        KernelConfig { backend }
    }
}
