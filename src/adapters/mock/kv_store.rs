//! In-memory key/value store for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// In-memory key/value store for testing.
///
/// Clones share the same map, so a test can hand one clone to the engine
/// and inspect the other.
///
/// # Example
///
/// ```ignore
/// use alumni_sync::adapters::mock::InMemoryStore;
/// use alumni_sync::traits::KeyValueStore;
///
/// let store = InMemoryStore::new();
/// store.set("viewedNotifications", "[1,2]")?;
/// assert_eq!(store.get("viewedNotifications")?.as_deref(), Some("[1,2]"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    /// Whether writes should fail
    write_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut values = store.values.lock().unwrap();
            for (k, v) in entries {
                values.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Configure whether set/update/remove should fail.
    pub fn set_write_should_fail(&self, should_fail: bool) {
        *self.write_should_fail.lock().unwrap() = should_fail;
    }

    /// Snapshot of the raw stored value for a key (for assertions).
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if *self.write_should_fail.lock().unwrap() {
            return Err(StorageError::Write {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "mock write failure"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(next) = f(values.remove(key)) {
            values.insert(key.to_string(), next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_take_clears_key() {
        let store = InMemoryStore::with_entries([("slot", "{}")]);
        assert_eq!(store.take("slot").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.take("slot").unwrap(), None);
    }

    #[test]
    fn test_update_sees_previous_value() {
        let store = InMemoryStore::with_entries([("n", "1")]);
        store
            .update("n", &mut |current| {
                let n: u32 = current.and_then(|c| c.parse().ok()).unwrap_or(0);
                Some((n + 1).to_string())
            })
            .unwrap();
        assert_eq!(store.raw("n").as_deref(), Some("2"));
    }

    #[test]
    fn test_write_failure() {
        let store = InMemoryStore::new();
        store.set_write_should_fail(true);
        assert!(store.set("k", "v").is_err());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.raw("k").as_deref(), Some("v"));
    }
}
