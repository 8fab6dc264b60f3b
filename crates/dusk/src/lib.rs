//! Dark-mode preference reconciliation.
//!
//! `dusk` answers one question, "is dark mode on?", from three sources and
//! keeps two outputs in step with the answer:
//!
//! ```text
//!               explicit default ─┐
//!  OS color scheme (media query) ─┼─▶ DarkMode ─┬─▶ persisted preference
//!            persisted preference ─┘             └─▶ visual flag (tracks OS only)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dusk::{DarkMode, FileStore, OsColorScheme};
//!
//! let os = OsColorScheme::new();
//! let _watch = os.watch(OsColorScheme::DEFAULT_POLL_INTERVAL);
//!
//! let dark_mode = DarkMode::resolve(None, FileStore::new("/tmp/dusk", "console"), os);
//! let _sub = dark_mode.subscribe(|state| println!("dark mode: {}", state.user_preference));
//!
//! dark_mode.toggle();
//! ```
//!
//! # Resolution
//!
//! On [`DarkMode::resolve`], a valid persisted value wins. Otherwise the
//! [`SeedChain`] picks the explicit default, then the OS value, then `false`,
//! and the result is written to the store under [`STORAGE_KEY`].
//!
//! After that:
//!
//! - [`toggle`](DarkMode::toggle), [`enable`](DarkMode::enable) and
//!   [`disable`](DarkMode::disable) set and persist the value in one step
//! - every OS change overwrites the value and the store, and moves the
//!   visual flag
//! - [`refresh`](DarkMode::refresh) picks up writes made by other sessions
//!
//! # Failure
//!
//! Nothing here returns an error to the caller. If the store fails, a
//! warning is logged through the `log` facade and the value lives in memory
//! for the rest of the session. [`StorageError`] only appears when you call
//! a [`PreferenceStore`] directly.
//!
//! # Testing
//!
//! Use [`MemoryStore`] (clones share data, so a clone can play a second
//! session) and [`MockColorScheme`] (which notifies synchronously):
//!
//! ```rust
//! use dusk::{DarkMode, MemoryStore, MockColorScheme};
//!
//! let store = MemoryStore::new();
//! DarkMode::resolve(None, store.clone(), MockColorScheme::light()).enable();
//!
//! let next_session = DarkMode::resolve(None, store, MockColorScheme::unknown());
//! assert!(next_session.is_dark_mode());
//! ```

mod chain;
mod error;
mod mode;
mod observer;
mod options;
mod reconciler;
mod signal;
mod storage;

pub use chain::{ResolvedSeed, SeedChain, SeedSource};
pub use error::StorageError;
pub use mode::ColorMode;
pub use observer::ObserverId;
pub use options::{DarkModeOptions, DARK_CLASS};
pub use reconciler::{DarkMode, DarkModeState, Subscription};
pub use signal::{
    detect_color_scheme, reset_color_scheme_detector, set_color_scheme_detector,
    ColorSchemeSignal, MockColorScheme, OsColorScheme, WatchHandle, COLOR_SCHEME_QUERY,
};
pub use storage::{FileStore, MemoryStore, PreferenceStore, UnavailableStore, STORAGE_KEY};
