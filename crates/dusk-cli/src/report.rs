//! Rendering the reconciler state for the terminal.

use dusk::{ColorMode, DarkMode, DarkModeState, SeedSource};
use serde::Serialize;

/// What `dusk` prints after each command.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dark_mode: bool,
    pub color_mode: ColorMode,
    pub os_tracking_flag: bool,
    pub visual_class: Option<String>,
    pub persistent: bool,
    pub seeded_from: &'static str,
}

impl Report {
    pub fn new(dark_mode: &DarkMode) -> Self {
        Self::from_parts(
            dark_mode.state(),
            &dark_mode.options().class_name,
            dark_mode.seed().source,
        )
    }

    pub fn from_parts(state: DarkModeState, class_name: &str, seeded_from: SeedSource) -> Self {
        Self {
            dark_mode: state.user_preference,
            color_mode: state.color_mode(),
            os_tracking_flag: state.os_tracking_flag,
            visual_class: state.os_tracking_flag.then(|| class_name.to_string()),
            persistent: state.persistent,
            seeded_from: seeded_from.as_str(),
        }
    }

    pub fn render(&self, json: bool) -> String {
        if json {
            return serde_json::to_string(self)
                .unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"));
        }

        let storage = if self.persistent {
            "persisted"
        } else {
            "memory only"
        };
        let os = if self.os_tracking_flag { "dark" } else { "light" };
        format!(
            "dark mode: {} ({}; OS {}; {})",
            if self.dark_mode { "on" } else { "off" },
            self.color_mode,
            os,
            storage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dusk::{MemoryStore, MockColorScheme};

    #[test]
    fn text_report() {
        let dark_mode =
            DarkMode::resolve(Some(true), MemoryStore::new(), MockColorScheme::light());
        let report = Report::new(&dark_mode);
        assert_eq!(report.render(false), "dark mode: on (dark; OS light; persisted)");
    }

    #[test]
    fn json_report() {
        let dark_mode = DarkMode::resolve(None, MemoryStore::new(), MockColorScheme::dark());
        let value: serde_json::Value =
            serde_json::from_str(&Report::new(&dark_mode).render(true)).unwrap();

        assert_eq!(value["dark_mode"], true);
        assert_eq!(value["color_mode"], "dark");
        assert_eq!(value["visual_class"], "dark");
        assert_eq!(value["seeded_from"], "os");
    }
}
