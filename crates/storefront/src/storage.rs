//! Persistent key-value storage for client state.
//!
//! [`KeyValueStore`] is the port the cart and session stores persist through.
//! [`FileStore`] keeps everything in one JSON object on disk, the way browser
//! local storage keeps one map per origin. [`MemoryStore`] backs tests and
//! throwaway runs.
//!
//! [`StorageBridge`] sits on top of a store and never fails: unreadable data
//! loads as the default value and write failures are logged and dropped.
//! Losing persistence is acceptable; corrupting in-memory state is not.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Storage keys for persisted client state.
pub mod keys {
    /// Key for the serialized cart line list.
    pub const CART: &str = "cart_v1";

    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the advisory "remember me" flag.
    pub const REMEMBER_ME: &str = "remember_me";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key-value store with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// Name of the storage file inside the state directory.
const STORAGE_FILE: &str = "storage.json";

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so readers never observe a half-written file. A missing or corrupt
/// file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store whose file lives at `<dir>/storage.json`. The directory is
    /// created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&text) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt storage file");
                Ok(HashMap::new())
            }
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string(entries)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_all()?;
        change(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

// =============================================================================
// StorageBridge
// =============================================================================

/// Infallible typed access to a [`KeyValueStore`].
#[derive(Clone)]
pub struct StorageBridge {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for StorageBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBridge").finish_non_exhaustive()
    }
}

impl StorageBridge {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Bridge over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load a JSON value, or `T::default()` if it is absent or unreadable.
    #[must_use]
    pub fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.get_string(key) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Discarding unreadable stored value");
            T::default()
        })
    }

    /// Persist a JSON value. Failures are logged and swallowed.
    pub fn save<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_string(key, &raw),
            Err(e) => warn!(key, error = %e, "Failed to serialize value for storage"),
        }
    }

    /// Delete a key. Failures are logged and swallowed.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, error = %e, "Failed to remove stored value");
        }
    }

    /// Read a raw string value. Read failures count as absent.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "Failed to read stored value");
            None
        })
    }

    /// Write a raw string value. Failures are logged and swallowed.
    pub fn set_string(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "Failed to persist value");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Store whose every operation fails.
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    pub(crate) fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kasra-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = temp_dir();
        FileStore::new(&dir).set(keys::TOKEN, "abc").unwrap();
        FileStore::new(&dir).set(keys::REMEMBER_ME, "true").unwrap();

        let reopened = FileStore::new(&dir);
        assert_eq!(reopened.get(keys::TOKEN).unwrap().as_deref(), Some("abc"));
        reopened.remove(keys::TOKEN).unwrap();
        assert_eq!(FileStore::new(&dir).get(keys::TOKEN).unwrap(), None);
        assert_eq!(
            FileStore::new(&dir).get(keys::REMEMBER_ME).unwrap().as_deref(),
            Some("true")
        );
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_store_missing_or_corrupt_reads_empty() {
        let dir = temp_dir();
        let store = FileStore::new(&dir);
        assert_eq!(store.get("anything").unwrap(), None);

        fs::create_dir_all(&dir).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.get("anything").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_bridge_load_defaults_on_absent_or_corrupt() {
        let bridge = StorageBridge::in_memory();
        let absent: Vec<u32> = bridge.load("list");
        assert!(absent.is_empty());

        bridge.set_string("list", "[1, 2");
        let corrupt: Vec<u32> = bridge.load("list");
        assert!(corrupt.is_empty());

        bridge.save("list", &vec![1u32, 2]);
        let saved: Vec<u32> = bridge.load("list");
        assert_eq!(saved, [1, 2]);
    }

    #[test]
    fn test_bridge_swallows_backend_errors() {
        let bridge = StorageBridge::new(Arc::new(BrokenStore));
        bridge.save("list", &vec![1u32]);
        bridge.remove("list");
        bridge.set_string(keys::TOKEN, "t");
        assert_eq!(bridge.get_string(keys::TOKEN), None);
        let loaded: Vec<u32> = bridge.load("list");
        assert!(loaded.is_empty());
    }
}
