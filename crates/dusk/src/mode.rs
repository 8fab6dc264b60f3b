//! Light/dark color mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The color mode a UI should render in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light mode (light background, dark text).
    Light,
    /// Dark mode (dark background, light text).
    Dark,
}

impl ColorMode {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// The appearance name handed to UI kits: `"dark"` or `"light"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl From<bool> for ColorMode {
    fn from(dark: bool) -> Self {
        Self::from_dark(dark)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dark_and_back() {
        assert_eq!(ColorMode::from(true), ColorMode::Dark);
        assert_eq!(ColorMode::from(false), ColorMode::Light);
        assert!(ColorMode::Dark.is_dark());
        assert!(!ColorMode::Light.is_dark());
    }

    #[test]
    fn displays_appearance_name() {
        assert_eq!(ColorMode::Dark.to_string(), "dark");
        assert_eq!(ColorMode::Light.to_string(), "light");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ColorMode::Dark).unwrap(), "\"dark\"");
        let mode: ColorMode = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(mode, ColorMode::Light);
    }
}
