//! Persisted key-value preferences.
//!
//! [`PreferenceStore`] is the raw port: string keys to string values.
//! [`Preferences`] layers typed accessors on top and owns the JSON encoding
//! of each key.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

mod file;
mod prefs;

pub use file::JsonFileStore;
pub use prefs::{Preferences, KEY_API_KEY, KEY_CALENDAR_ID, KEY_LOCAL_EVENTS, KEY_TASKS, KEY_THEME, KEY_VISIBILITY};

/// Errors raised while persisting preferences.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded.
    #[error("Failed to encode preference {key}")]
    Serialize {
        /// Preference key.
        key: String,
        /// Underlying encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The temp file could not be moved over the store.
    #[error("Atomic write failed: could not rename {temp_path} to {path}")]
    WriteAtomic {
        /// Final store path.
        path: PathBuf,
        /// Temp file left behind.
        temp_path: PathBuf,
    },
}

/// String key-value storage for preferences.
///
/// Implementations use interior mutability so a store can be shared behind
/// `&self`.
pub trait PreferenceStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_and_removes() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "light").expect("set");
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        store.remove("theme").expect("remove");
        store.remove("theme").expect("second remove is a no-op");
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn write_atomic_display_names_both_paths() {
        let err = StoreError::WriteAtomic {
            path: PathBuf::from("/data/preferences.json"),
            temp_path: PathBuf::from("/data/preferences.json.tmp"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/preferences.json.tmp"));
        assert!(msg.contains("to /data/preferences.json"));
    }
}
