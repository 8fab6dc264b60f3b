//! Durable storage for the persisted preference.
//!
//! Stores are plain string key/value maps, the same shape as browser
//! `localStorage`. The reconciler writes the preference as a JSON boolean
//! (`true` / `false`) under [`STORAGE_KEY`], so any tool that reads the raw
//! value sees the same encoding the console has always used.
//!
//! Three stores ship with the crate:
//!
//! - [`MemoryStore`]: in-process only; clones share the same map
//! - [`FileStore`]: one JSON object file per origin, replaced atomically on write
//! - [`UnavailableStore`]: always fails, standing in for disabled storage
//!
//! The reconciler talks to its store through [`Persisted`], which owns the
//! degrade-to-memory policy: the first failing call is logged and every later
//! read/write for that session stays in memory.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::StorageError;

/// Key the preference is persisted under.
pub const STORAGE_KEY: &str = "usehooks-ts-dark-mode";

/// A durable string key/value store.
///
/// Implementations return `Ok(None)` for a missing key and reserve `Err` for
/// real failures (disabled storage, I/O errors, corrupt backing data).
pub trait PreferenceStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// === In-memory store ===

/// In-process store. Cloning yields a handle to the same map, which is how
/// tests simulate a second session against the same storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::unavailable("memory store lock poisoned"))
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

// === File store ===

/// File-backed store: one JSON object per origin at `<dir>/<origin>.json`.
///
/// Every call re-reads the file, so a value written by another process is
/// visible on the next read. Writes go to a sibling temp file that is then
/// renamed over the original. Concurrent writers are not coordinated; the
/// last rename wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Default origin name used when none is given.
    pub const DEFAULT_ORIGIN: &'static str = "default";

    /// Create a store for `origin` under `dir`. Nothing touches the disk
    /// until the first write.
    pub fn new(dir: impl AsRef<Path>, origin: &str) -> Self {
        let file_name = format!("{}.json", sanitize_origin(origin));
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Keep origin names usable as file names.
fn sanitize_origin(origin: &str) -> String {
    let cleaned: String = origin
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        FileStore::DEFAULT_ORIGIN.to_string()
    } else {
        cleaned
    }
}

// === Unavailable store ===

/// A store that rejects every call, like storage in a restricted context.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    /// Create a store that fails with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableStore {
    fn default() -> Self {
        Self::new("storage disabled")
    }
}

impl PreferenceStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::unavailable(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable(self.reason.clone()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable(self.reason.clone()))
    }
}

// === Persisted preference ===

/// The persisted boolean, as seen by the reconciler.
///
/// Encodes values as JSON booleans and never returns an error. Once the
/// underlying store fails, the value lives in memory until the session ends.
pub(crate) struct Persisted {
    store: Box<dyn PreferenceStore>,
    key: String,
    /// Last value read from or written to the store.
    last: Option<bool>,
    /// `Some` once the store has failed; holds the in-memory value.
    degraded: Option<Option<bool>>,
}

impl Persisted {
    pub(crate) fn new(store: Box<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last: None,
            degraded: None,
        }
    }

    /// Read the stored value. Missing or unparsable values read as `None`.
    ///
    /// A failing store keeps answering with the last known value.
    pub(crate) fn read(&mut self) -> Option<bool> {
        if let Some(value) = self.degraded {
            return value;
        }

        match self.store.get(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<bool>(&raw) {
                Ok(value) => {
                    self.last = Some(value);
                    Some(value)
                }
                Err(err) => {
                    log::warn!(
                        "ignoring persisted value {raw:?} under {:?}: {err}",
                        self.key
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                self.degrade(&err, self.last);
                self.last
            }
        }
    }

    /// Write `value`. On failure, keep it in memory instead.
    pub(crate) fn write(&mut self, value: bool) {
        if self.degraded.is_some() {
            self.degraded = Some(Some(value));
            return;
        }

        let encoded = if value { "true" } else { "false" };
        match self.store.set(&self.key, encoded) {
            Ok(()) => self.last = Some(value),
            Err(err) => self.degrade(&err, Some(value)),
        }
    }

    /// Whether the store has failed and values are memory-only.
    pub(crate) fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    fn degrade(&mut self, err: &StorageError, value: Option<bool>) {
        log::warn!(
            "preference storage failed ({err}); keeping {:?} in memory for this session",
            self.key
        );
        self.degraded = Some(value);
    }
}
