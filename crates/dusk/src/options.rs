//! Reconciler configuration.

use serde::{Deserialize, Serialize};

use crate::signal::COLOR_SCHEME_QUERY;
use crate::storage::STORAGE_KEY;

/// Class name the visual flag stands for.
pub const DARK_CLASS: &str = "dark";

/// Configuration for [`DarkMode`](crate::DarkMode).
///
/// The defaults match the values the admin console has always used, so a
/// default-configured reconciler reads and writes the same storage entry.
///
/// ```rust
/// use dusk::DarkModeOptions;
///
/// let options = DarkModeOptions::new()
///     .default_value(true)
///     .storage_key("console-dark-mode");
/// assert_eq!(options.default, Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkModeOptions {
    /// Explicit default; first link of the seed chain.
    pub default: Option<bool>,
    /// Key the preference is persisted under.
    pub storage_key: String,
    /// Media query the OS signal is expected to answer.
    pub media_query: String,
    /// Class name reported for the visual flag.
    pub class_name: String,
}

impl DarkModeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit default.
    pub fn default_value(mut self, value: bool) -> Self {
        self.default = Some(value);
        self
    }

    /// Set or clear the explicit default.
    pub fn maybe_default(mut self, value: Option<bool>) -> Self {
        self.default = value;
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn media_query(mut self, query: impl Into<String>) -> Self {
        self.media_query = query.into();
        self
    }

    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }
}

impl Default for DarkModeOptions {
    fn default() -> Self {
        Self {
            default: None,
            storage_key: STORAGE_KEY.to_string(),
            media_query: COLOR_SCHEME_QUERY.to_string(),
            class_name: DARK_CLASS.to_string(),
        }
    }
}
