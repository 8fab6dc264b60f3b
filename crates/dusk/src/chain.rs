//! The default source chain for seeding a fresh preference.
//!
//! When nothing is persisted yet, the preference is seeded from the first
//! source that has a value:
//!
//! ```text
//! SeedChain
//! ├── Explicit   → None (caller gave no default)
//! ├── OsSignal   → Some(true) ← returns this
//! └── Fallback   → (not reached, always false)
//! ```

use std::fmt;

use crate::signal::ColorSchemeSignal;

/// Which link of the chain produced the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    /// The caller's explicit default.
    Explicit,
    /// The OS signal's current value.
    OsSignal,
    /// The hardcoded `false`.
    Fallback,
    /// A value already persisted by an earlier session.
    Persisted,
}

impl SeedSource {
    /// Short machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::OsSignal => "os",
            Self::Fallback => "fallback",
            Self::Persisted => "persisted",
        }
    }
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit default"),
            Self::OsSignal => write!(f, "OS color scheme"),
            Self::Fallback => write!(f, "fallback"),
            Self::Persisted => write!(f, "persisted value"),
        }
    }
}

/// A resolved seed value and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSeed {
    pub value: bool,
    pub source: SeedSource,
}

/// Resolves the seed: explicit default, then OS signal, then `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedChain {
    explicit: Option<bool>,
}

impl SeedChain {
    /// The value used when neither the caller nor the OS has one.
    pub const FALLBACK: bool = false;

    pub fn new(explicit: Option<bool>) -> Self {
        Self { explicit }
    }

    /// Resolve against `signal`'s current value.
    pub fn resolve(&self, signal: &dyn ColorSchemeSignal) -> ResolvedSeed {
        self.resolve_with(signal.matches())
    }

    /// Resolve against an already-read OS value.
    pub fn resolve_with(&self, os_value: Option<bool>) -> ResolvedSeed {
        if let Some(value) = self.explicit {
            return ResolvedSeed {
                value,
                source: SeedSource::Explicit,
            };
        }

        if let Some(value) = os_value {
            return ResolvedSeed {
                value,
                source: SeedSource::OsSignal,
            };
        }

        ResolvedSeed {
            value: Self::FALLBACK,
            source: SeedSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::MockColorScheme;

    #[test]
    fn explicit_default_wins_over_os() {
        let seed = SeedChain::new(Some(true)).resolve(&MockColorScheme::light());
        assert_eq!(
            seed,
            ResolvedSeed {
                value: true,
                source: SeedSource::Explicit
            }
        );

        let seed = SeedChain::new(Some(false)).resolve(&MockColorScheme::dark());
        assert!(!seed.value);
        assert_eq!(seed.source, SeedSource::Explicit);
    }

    #[test]
    fn os_signal_used_without_explicit_default() {
        let seed = SeedChain::new(None).resolve(&MockColorScheme::dark());
        assert!(seed.value);
        assert_eq!(seed.source, SeedSource::OsSignal);

        let seed = SeedChain::new(None).resolve(&MockColorScheme::light());
        assert!(!seed.value);
        assert_eq!(seed.source, SeedSource::OsSignal);
    }

    #[test]
    fn falls_through_to_false() {
        let seed = SeedChain::new(None).resolve(&MockColorScheme::unknown());
        assert!(!seed.value);
        assert_eq!(seed.source, SeedSource::Fallback);
    }

    #[test]
    fn seed_source_display() {
        assert_eq!(SeedSource::Explicit.to_string(), "explicit default");
        assert_eq!(SeedSource::OsSignal.to_string(), "OS color scheme");
        assert_eq!(SeedSource::Persisted.to_string(), "persisted value");
        assert_eq!(SeedSource::OsSignal.as_str(), "os");
        assert_eq!(SeedSource::Explicit.as_str(), "explicit");
    }
}
