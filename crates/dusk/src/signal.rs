//! The OS color-scheme signal.
//!
//! The reconciler only needs two things from the operating system: the
//! current answer to the [`COLOR_SCHEME_QUERY`] media query, and a
//! notification when that answer changes. [`ColorSchemeSignal`] captures
//! exactly that, so the reconciler can run against the real OS
//! ([`OsColorScheme`]) or a scripted one ([`MockColorScheme`]).
//!
//! An answer is `Option<bool>`: `None` means the value is not known (yet).
//! Listeners are only told about known values, and only when they change.
//!
//! # Detection
//!
//! [`OsColorScheme`] asks [`detect_color_scheme`], which uses the
//! `dark-light` crate by default. Override it for testing with
//! [`set_color_scheme_detector`]:
//!
//! ```rust
//! use dusk::{detect_color_scheme, reset_color_scheme_detector, set_color_scheme_detector};
//!
//! set_color_scheme_detector(|| Some(true));
//! assert_eq!(detect_color_scheme(), Some(true));
//! reset_color_scheme_detector();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;

use crate::observer::{ObserverId, ObserverList};

/// The media query whose answer is the OS signal.
pub const COLOR_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// A live, read-only boolean reporting whether the OS prefers a dark scheme.
pub trait ColorSchemeSignal: Send + Sync {
    /// The media query this signal answers.
    fn query(&self) -> &str {
        COLOR_SCHEME_QUERY
    }

    /// Current answer, or `None` if it is not known.
    fn matches(&self) -> Option<bool>;

    /// Register a listener called with each new known value.
    fn add_listener(&self, listener: Box<dyn Fn(bool) + Send + Sync>) -> ObserverId;

    /// Remove a listener registered with [`add_listener`](Self::add_listener).
    fn remove_listener(&self, id: ObserverId);
}

// === Detector ===

type ColorSchemeDetector = fn() -> Option<bool>;

static DETECTOR: Lazy<Mutex<ColorSchemeDetector>> = Lazy::new(|| Mutex::new(os_detector));

/// Overrides the detector used by [`detect_color_scheme`].
///
/// This is useful for testing or when the embedding application knows the
/// scheme better than the OS query does.
pub fn set_color_scheme_detector(detector: ColorSchemeDetector) {
    *DETECTOR.lock().unwrap_or_else(PoisonError::into_inner) = detector;
}

/// Restores OS detection after [`set_color_scheme_detector`].
pub fn reset_color_scheme_detector() {
    set_color_scheme_detector(os_detector);
}

/// Asks the configured detector whether the OS prefers a dark scheme.
///
/// # Returns
///
/// - `Some(true)` if the OS is in dark mode
/// - `Some(false)` if it is in light mode or states no preference
/// - `None` if the platform could not be queried
pub fn detect_color_scheme() -> Option<bool> {
    let detector = *DETECTOR.lock().unwrap_or_else(PoisonError::into_inner);
    detector()
}

fn os_detector() -> Option<bool> {
    match detect_os_theme() {
        Ok(OsThemeMode::Dark) => Some(true),
        // Like the media query, "no preference" does not match dark.
        Ok(OsThemeMode::Light) | Ok(OsThemeMode::Unspecified) => Some(false),
        Err(err) => {
            log::debug!("color scheme detection failed: {err}");
            None
        }
    }
}

// === Shared state ===

#[derive(Debug, Default)]
struct SignalState {
    value: Mutex<Option<bool>>,
    listeners: ObserverList<bool>,
}

impl SignalState {
    fn new(value: Option<bool>) -> Self {
        Self {
            value: Mutex::new(value),
            listeners: ObserverList::new(),
        }
    }

    fn current(&self) -> Option<bool> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `next`; notify listeners if it is a newly known value.
    fn update(&self, next: Option<bool>) -> bool {
        let changed = {
            let mut value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *value != next;
            *value = next;
            changed
        };

        match next {
            Some(dark) if changed => {
                self.listeners.notify(&dark);
                true
            }
            _ => false,
        }
    }

    fn add_listener(&self, listener: Box<dyn Fn(bool) + Send + Sync>) -> ObserverId {
        self.listeners.add(move |dark: &bool| listener(*dark))
    }
}

// === OS implementation ===

/// The real OS signal.
///
/// The value is detected once on construction. The OS does not push changes
/// to us, so they are picked up by [`poll`](Self::poll), either called by the
/// application's own loop or by a [`watch`](Self::watch) thread. Clones share
/// the same value and listeners.
#[derive(Debug, Clone)]
pub struct OsColorScheme {
    state: Arc<SignalState>,
}

impl OsColorScheme {
    /// Default interval for [`watch`](Self::watch).
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            state: Arc::new(SignalState::new(detect_color_scheme())),
        }
    }

    /// Detect the current value and notify listeners if it changed.
    ///
    /// Returns the detected value.
    pub fn poll(&self) -> Option<bool> {
        let detected = detect_color_scheme();
        if self.state.update(detected) {
            log::debug!("OS color scheme changed: dark={detected:?}");
        }
        detected
    }

    /// Poll on a background thread every `interval` until the returned
    /// handle is dropped.
    pub fn watch(&self, interval: Duration) -> WatchHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let signal = self.clone();
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("dusk-color-scheme".to_string())
            .spawn(move || {
                while !thread_stop.load(Ordering::Acquire) {
                    thread::park_timeout(interval);
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    signal.poll();
                }
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!("could not start color scheme watcher: {err}");
                None
            }
        };

        WatchHandle { stop, thread }
    }
}

impl Default for OsColorScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeSignal for OsColorScheme {
    fn matches(&self) -> Option<bool> {
        self.state.current()
    }

    fn add_listener(&self, listener: Box<dyn Fn(bool) + Send + Sync>) -> ObserverId {
        self.state.add_listener(listener)
    }

    fn remove_listener(&self, id: ObserverId) {
        self.state.listeners.remove(id);
    }
}

/// Stops an [`OsColorScheme::watch`] thread when dropped.
#[derive(Debug)]
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Whether the watcher thread was started.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
    }
}

// === Mock implementation ===

/// A scripted signal for tests and embedders that drive the value themselves.
///
/// [`set`](Self::set) notifies listeners synchronously, before it returns.
/// Clones share the same value and listeners.
#[derive(Debug, Clone)]
pub struct MockColorScheme {
    state: Arc<SignalState>,
}

impl MockColorScheme {
    pub fn new(value: Option<bool>) -> Self {
        Self {
            state: Arc::new(SignalState::new(value)),
        }
    }

    /// A signal reporting a dark OS scheme.
    pub fn dark() -> Self {
        Self::new(Some(true))
    }

    /// A signal reporting a light OS scheme.
    pub fn light() -> Self {
        Self::new(Some(false))
    }

    /// A signal with no known value.
    pub fn unknown() -> Self {
        Self::new(None)
    }

    /// Change the value, notifying listeners if a known value changed.
    pub fn set(&self, value: Option<bool>) {
        self.state.update(value);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }
}

impl ColorSchemeSignal for MockColorScheme {
    fn matches(&self) -> Option<bool> {
        self.state.current()
    }

    fn add_listener(&self, listener: Box<dyn Fn(bool) + Send + Sync>) -> ObserverId {
        self.state.add_listener(listener)
    }

    fn remove_listener(&self, id: ObserverId) {
        self.state.listeners.remove(id);
    }
}
