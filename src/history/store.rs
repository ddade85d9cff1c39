//! Key-value storage behind the history log and settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use super::HistoryError;

/// String key-value store.
///
/// Values are opaque strings (JSON in practice). Implementations use
/// interior mutability so one store can be shared behind an [`Arc`].
pub trait KeyValueStore: Send + Sync {
    /// Reads the value at `key`.
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;

    /// Writes `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<(), HistoryError>;

    /// Deletes `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), HistoryError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        (**self).remove(key)
    }
}

fn lock(
    entries: &Mutex<BTreeMap<String, String>>,
) -> Result<MutexGuard<'_, BTreeMap<String, String>>, HistoryError> {
    entries
        .lock()
        .map_err(|_| HistoryError::new("store lock poisoned"))
}

/// In-memory store, lost on drop.
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

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        lock(&self.entries)?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
///
/// The whole map is rewritten on every change via a temp file and rename,
/// so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating it lazily on first write.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the file exists but cannot be read or
    /// is not a JSON object of strings.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        info!(keys = entries.len(), "Opened JSON store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self, entries), fields(path = %self.path.display()))]
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(keys = entries.len(), "Store flushed");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        let mut entries = lock(&self.entries)?;
        entries.insert(key.to_string(), value);
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        let mut entries = lock(&self.entries)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_shared_through_arc() {
        let store = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);
        store.set("muted", "true".into()).unwrap();
        assert_eq!(other.get("muted").unwrap().as_deref(), Some("true"));
    }
}
