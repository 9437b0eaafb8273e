//! File-backed key/value store.
//!
//! All keys live in one JSON object (`store.json`) inside the data
//! directory. The file is loaded once when the store opens and rewritten
//! through a temporary file on every change, so a crash mid-write leaves the
//! previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::traits::KeyValueStore;

const STORE_FILE: &str = "store.json";

/// File-backed [`KeyValueStore`].
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open (or create) the store inside `data_dir`.
    ///
    /// A store file that is not valid JSON is treated as empty and will be
    /// overwritten by the next write.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir).map_err(|source| StorageError::Write {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let path = data_dir.join(STORE_FILE);
        let values = Self::load(&path)?;

        tracing::debug!("Opened key/value store at {} ({} keys)", path.display(), values.len());

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(path).map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match serde_json::from_str(&json) {
            Ok(values) => Ok(values),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable store file {}: {}",
                    path.display(),
                    StorageError::Corrupt {
                        path: path.to_path_buf(),
                        source: e,
                    }
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(values).map_err(|source| StorageError::Encode {
            key: STORE_FILE.to_string(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let current = values.get(key).cloned();
        let had_value = current.is_some();

        let mut next = values.clone();
        match f(current) {
            Some(value) => {
                next.insert(key.to_string(), value);
            }
            None if !had_value => return Ok(()),
            None => {
                next.remove(key);
            }
        }

        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileKeyValueStore::open(dir.path()).unwrap();
            store.set("viewedNotifications", "[\"1\",\"2\"]").unwrap();
        }

        let store = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get("viewedNotifications").unwrap().as_deref(),
            Some("[\"1\",\"2\"]")
        );
    }

    #[test]
    fn test_take_is_persisted() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.set("newPostNotif", "{}").unwrap();

        assert_eq!(store.take("newPostNotif").unwrap().as_deref(), Some("{}"));

        let reopened = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("newPostNotif").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not valid json").unwrap();

        let store = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);

        store.set("k", "v").unwrap();
        let reopened = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::open(&nested).unwrap();
        store.set("k", "v").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_remove_missing_key_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.remove("missing").unwrap();
        assert!(!store.path().exists());
    }
}
