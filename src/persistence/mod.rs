//! Simple key/value persistence
//!
//! Backends:
//! - `MemoryStore` for tests and headless runs
//! - `JsonFileStore` (native): one JSON object on disk, written via tmp + rename
//! - `LocalStorageStore` (wasm32): browser LocalStorage

use std::collections::BTreeMap;

use crate::error::StorageError;

/// String key/value storage. Integers are stored as their JSON text.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        match self.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StorageError> {
        self.set(key, &value.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::KeyValueStore;
    use crate::error::StorageError;

    /// All keys in one JSON object file
    #[derive(Debug, Clone)]
    pub struct JsonFileStore {
        path: PathBuf,
        values: BTreeMap<String, String>,
    }

    impl JsonFileStore {
        /// Open `path`, starting empty if it does not exist yet
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
            let path = path.as_ref().to_path_buf();
            let values = match fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str(&text)?,
                Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
                Err(e) => return Err(e.into()),
            };
            log::debug!("Opened store {} ({} keys)", path.display(), values.len());
            Ok(Self { path, values })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) -> Result<(), StorageError> {
            let json = serde_json::to_string_pretty(&self.values)?;
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl KeyValueStore for JsonFileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.values.insert(key.to_string(), value.to_string());
            self.flush()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::KeyValueStore;
    use crate::error::StorageError;

    /// Browser LocalStorage, keys namespaced by `prefix`
    pub struct LocalStorageStore {
        storage: web_sys::Storage,
        prefix: String,
    }

    impl LocalStorageStore {
        pub fn open(prefix: impl Into<String>) -> Result<Self, StorageError> {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)?;
            Ok(Self {
                storage,
                prefix: prefix.into(),
            })
        }

        fn full_key(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(&self.full_key(key))
                .map_err(|_| StorageError::Unavailable)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(&self.full_key(key), value)
                .map_err(|_| StorageError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_ints() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_int("HighScore").unwrap(), None);
        store.set_int("HighScore", 420).unwrap();
        assert_eq!(store.get_int("HighScore").unwrap(), Some(420));
    }

    #[test]
    fn test_corrupt_int_is_an_error() {
        let mut store = MemoryStore::new();
        store.set("HighScore", "lots").unwrap();
        assert!(matches!(store.get_int("HighScore"), Err(StorageError::Json(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_store_persists() {
        let path = std::env::temp_dir().join(format!("swarm_survivor_store_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert_eq!(store.get_int("HighScore").unwrap(), None);
            store.set_int("HighScore", 77).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_int("HighScore").unwrap(), Some(77));

        std::fs::remove_file(&path).unwrap();
    }
}
