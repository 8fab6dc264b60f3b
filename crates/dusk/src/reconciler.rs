//! The preference reconciler.
//!
//! [`DarkMode`] keeps one answer to "is dark mode on" in sync with three
//! inputs and two outputs:
//!
//! - inputs: the caller's explicit default, the OS signal, the persisted value
//! - outputs: the persisted value, and a visual flag tracking the OS signal
//!
//! ## Two fields, two signals
//!
//! The state carries two booleans on purpose:
//!
//! - `user_preference` is what [`toggle`](DarkMode::toggle),
//!   [`enable`](DarkMode::enable) and [`disable`](DarkMode::disable) change.
//!   It is what [`is_dark_mode`](DarkMode::is_dark_mode) reports and what is
//!   persisted.
//! - `os_tracking_flag` follows the OS signal only. A manual toggle does not
//!   move it; the next OS change (or the next session) does.
//!
//! Callers choose which one to render. An OS change overwrites both.
//!
//! ## Lifecycle
//!
//! ```text
//! resolve() ── seed ──▶ seeded ──┬── toggle/enable/disable ──▶ updated
//!                                ├── OS signal change ───────▶ updated
//!                                └── refresh() ──────────────▶ updated
//! ```
//!
//! The OS listener is removed when the last handle is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;

use crate::chain::{ResolvedSeed, SeedChain, SeedSource};
use crate::mode::ColorMode;
use crate::observer::{ObserverId, ObserverList};
use crate::options::DarkModeOptions;
use crate::signal::ColorSchemeSignal;
use crate::storage::{Persisted, PreferenceStore};

/// Snapshot of the reconciler's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DarkModeState {
    /// The reported preference, as set by explicit calls and OS changes.
    pub user_preference: bool,
    /// The visual flag, which tracks the OS signal only.
    pub os_tracking_flag: bool,
    /// `false` once storage has failed and the value is memory-only.
    pub persistent: bool,
}

impl DarkModeState {
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from_dark(self.user_preference)
    }
}

/// Handle to a dark-mode preference.
///
/// Cloning is cheap; clones share the same state, observers and OS
/// subscription.
///
/// ```rust
/// use dusk::{DarkMode, MemoryStore, MockColorScheme};
///
/// let os = MockColorScheme::dark();
/// let dark_mode = DarkMode::resolve(Some(false), MemoryStore::new(), os.clone());
/// assert!(!dark_mode.is_dark_mode());
///
/// dark_mode.toggle();
/// assert!(dark_mode.is_dark_mode());
///
/// // The OS switching to light wins over the manual toggle.
/// os.set(Some(false));
/// assert!(!dark_mode.is_dark_mode());
/// ```
#[derive(Clone)]
pub struct DarkMode {
    shared: Arc<Shared>,
}

struct Shared {
    options: DarkModeOptions,
    signal: Box<dyn ColorSchemeSignal>,
    signal_listener: Mutex<Option<ObserverId>>,
    seed: ResolvedSeed,
    core: Mutex<Core>,
    observers: ObserverList<DarkModeState>,
}

struct Core {
    persisted: Persisted,
    user_preference: bool,
    os_tracking_flag: bool,
    /// Last known OS value, used when reseeding.
    os_value: Option<bool>,
}

impl Core {
    fn snapshot(&self) -> DarkModeState {
        DarkModeState {
            user_preference: self.user_preference,
            os_tracking_flag: self.os_tracking_flag,
            persistent: !self.persisted.is_degraded(),
        }
    }
}

impl DarkMode {
    /// Resolve the preference with an optional explicit default.
    ///
    /// A valid persisted value wins. Otherwise the value is seeded from the
    /// explicit default, then the OS signal, then `false`, and written back
    /// to the store.
    pub fn resolve<S, C>(explicit_default: Option<bool>, store: S, signal: C) -> Self
    where
        S: PreferenceStore + 'static,
        C: ColorSchemeSignal + 'static,
    {
        let options = DarkModeOptions::new().maybe_default(explicit_default);
        Self::with_options(options, store, signal)
    }

    /// Resolve the preference with full configuration.
    pub fn with_options<S, C>(options: DarkModeOptions, store: S, signal: C) -> Self
    where
        S: PreferenceStore + 'static,
        C: ColorSchemeSignal + 'static,
    {
        if signal.query() != options.media_query {
            log::warn!(
                "OS signal answers {:?}, not the configured {:?}",
                signal.query(),
                options.media_query
            );
        }

        let mut persisted = Persisted::new(Box::new(store), options.storage_key.clone());
        let os_value = signal.matches();

        let seed = match persisted.read() {
            Some(value) => ResolvedSeed {
                value,
                source: SeedSource::Persisted,
            },
            None => {
                let seed = SeedChain::new(options.default).resolve_with(os_value);
                persisted.write(seed.value);
                seed
            }
        };
        log::debug!("dark mode seeded from {}: {}", seed.source, seed.value);

        let core = Core {
            persisted,
            user_preference: seed.value,
            os_tracking_flag: os_value.unwrap_or(false),
            os_value,
        };

        let shared = Arc::new(Shared {
            options,
            signal: Box::new(signal),
            signal_listener: Mutex::new(None),
            seed,
            core: Mutex::new(core),
            observers: ObserverList::new(),
        });

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        let id = shared.signal.add_listener(Box::new(move |dark| {
            if let Some(shared) = weak.upgrade() {
                shared.apply_os_change(dark);
            }
        }));
        *shared
            .signal_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id);

        // Catch a change that landed between the first read and the listener.
        let current = shared.signal.matches();
        if let Some(dark) = current.filter(|_| current != os_value) {
            shared.apply_os_change(dark);
        }

        Self { shared }
    }

    /// Whether dark mode is on.
    pub fn is_dark_mode(&self) -> bool {
        self.shared.core().user_preference
    }

    /// [`is_dark_mode`](Self::is_dark_mode) as a [`ColorMode`].
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from_dark(self.is_dark_mode())
    }

    /// Flip the preference and persist it.
    pub fn toggle(&self) {
        self.shared.update(|current| !current);
    }

    /// Turn dark mode on and persist it.
    pub fn enable(&self) {
        self.shared.update(|_| true);
    }

    /// Turn dark mode off and persist it.
    pub fn disable(&self) {
        self.shared.update(|_| false);
    }

    /// Snapshot of both named fields.
    pub fn state(&self) -> DarkModeState {
        self.shared.core().snapshot()
    }

    /// The visual flag's class name while the flag is set.
    pub fn visual_class(&self) -> Option<&str> {
        if self.shared.core().os_tracking_flag {
            Some(self.shared.options.class_name.as_str())
        } else {
            None
        }
    }

    /// How this session's value was first resolved.
    pub fn seed(&self) -> ResolvedSeed {
        self.shared.seed
    }

    /// The configured media query.
    pub fn query(&self) -> &str {
        &self.shared.options.media_query
    }

    pub fn options(&self) -> &DarkModeOptions {
        &self.shared.options
    }

    /// Re-read the persisted value to pick up a write from another session.
    ///
    /// If the entry has disappeared it is seeded again. Returns the current
    /// value.
    pub fn refresh(&self) -> bool {
        let (before, after) = {
            let mut core = self.shared.core();
            let before = core.snapshot();
            match core.persisted.read() {
                Some(value) => core.user_preference = value,
                None if core.persisted.is_degraded() => {}
                None => {
                    let seed = SeedChain::new(self.shared.options.default)
                        .resolve_with(core.os_value);
                    log::debug!("persisted preference missing; reseeding from {}", seed.source);
                    core.user_preference = seed.value;
                    core.persisted.write(seed.value);
                }
            }
            (before, core.snapshot())
        };

        if before != after {
            self.shared.observers.notify(&after);
        }
        after.user_preference
    }

    /// Register `observer`, called synchronously with the new state after
    /// every change. The observer is removed when the subscription drops.
    #[must_use = "dropping the subscription removes the observer"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&DarkModeState) + Send + Sync + 'static,
    {
        let id = self.shared.observers.add(observer);
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id: Some(id),
        }
    }
}

impl std::fmt::Debug for DarkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarkMode")
            .field("state", &self.state())
            .field("seed", &self.shared.seed)
            .field("observers", &self.shared.observers)
            .finish()
    }
}

impl Shared {
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the preference from its current value and persist it, as one step.
    fn update(&self, next: impl FnOnce(bool) -> bool) {
        let (before, after) = {
            let mut core = self.core();
            let before = core.snapshot();
            let value = next(core.user_preference);
            core.user_preference = value;
            core.persisted.write(value);
            (before, core.snapshot())
        };

        if before != after {
            self.observers.notify(&after);
        }
    }

    fn apply_os_change(&self, dark: bool) {
        let (before, after) = {
            let mut core = self.core();
            let before = core.snapshot();
            core.os_value = Some(dark);
            core.os_tracking_flag = dark;
            core.user_preference = dark;
            core.persisted.write(dark);
            (before, core.snapshot())
        };

        log::debug!("OS color scheme changed; dark mode now {dark}");
        if before != after {
            self.observers.notify(&after);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let id = self
            .signal_listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = id {
            self.signal.remove_listener(id);
        }
    }
}

/// Keeps an observer registered until dropped or [`cancel`](Self::cancel)led.
#[derive(Debug)]
pub struct Subscription {
    shared: Weak<Shared>,
    id: Option<ObserverId>,
}

impl Subscription {
    /// Remove the observer now.
    pub fn cancel(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let (Some(id), Some(shared)) = (self.id.take(), self.shared.upgrade()) {
            shared.observers.remove(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
