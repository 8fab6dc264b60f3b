//! Property-based tests for the reconciler using proptest.

use dusk::{DarkMode, MemoryStore, MockColorScheme, PreferenceStore, STORAGE_KEY};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Toggle,
    Enable,
    Disable,
    Os(Option<bool>),
    Refresh,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Toggle),
        Just(Action::Enable),
        Just(Action::Disable),
        prop::option::of(any::<bool>()).prop_map(Action::Os),
        Just(Action::Refresh),
    ]
}

/// Reference model: what the reconciler should report after each action.
#[derive(Debug)]
struct Model {
    preference: bool,
    visual: bool,
    os: Option<bool>,
}

impl Model {
    fn apply(&mut self, action: Action) {
        match action {
            Action::Toggle => self.preference = !self.preference,
            Action::Enable => self.preference = true,
            Action::Disable => self.preference = false,
            Action::Os(next) => {
                if let Some(dark) = next {
                    if self.os != Some(dark) {
                        self.preference = dark;
                        self.visual = dark;
                    }
                }
                self.os = next;
            }
            Action::Refresh => {}
        }
    }
}

proptest! {
    /// After any sequence of actions, the reported value matches the model
    /// and the store holds the same value.
    #[test]
    fn reconciler_matches_model(
        explicit in prop::option::of(any::<bool>()),
        initial_os in prop::option::of(any::<bool>()),
        actions in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let store = MemoryStore::new();
        let os = MockColorScheme::new(initial_os);
        let dark_mode = DarkMode::resolve(explicit, store.clone(), os.clone());

        let mut model = Model {
            preference: explicit.or(initial_os).unwrap_or(false),
            visual: initial_os.unwrap_or(false),
            os: initial_os,
        };

        for action in actions {
            match action {
                Action::Toggle => dark_mode.toggle(),
                Action::Enable => dark_mode.enable(),
                Action::Disable => dark_mode.disable(),
                Action::Os(next) => os.set(next),
                Action::Refresh => {
                    dark_mode.refresh();
                }
            }
            model.apply(action);

            let state = dark_mode.state();
            prop_assert_eq!(state.user_preference, model.preference);
            prop_assert_eq!(state.os_tracking_flag, model.visual);
            prop_assert_eq!(
                store.get(STORAGE_KEY).unwrap(),
                Some(model.preference.to_string())
            );
        }
    }

    /// Toggling an even number of times is a no-op.
    #[test]
    fn even_toggles_restore_value(start in any::<bool>(), pairs in 0usize..10) {
        let dark_mode = DarkMode::resolve(Some(start), MemoryStore::new(), MockColorScheme::unknown());
        for _ in 0..pairs * 2 {
            dark_mode.toggle();
        }
        prop_assert_eq!(dark_mode.is_dark_mode(), start);
    }
}
