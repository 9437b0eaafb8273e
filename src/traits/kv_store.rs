//! Persisted key/value store abstraction.
//!
//! Durable local storage that survives restarts. Values are JSON text, one
//! document per key. Both the read-state tracker and the one-shot injection
//! channel are handed a store instead of reaching for a global.

use crate::error::StorageError;

/// Trait for a process-wide persisted key/value store.
///
/// Every method is a single atomic step with respect to other calls on the
/// same key. Callers that need read-modify-write semantics use
/// [`KeyValueStore::update`] rather than a `get` followed by a `set`.
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key. Returns `None` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a key to a value, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Atomically replace the value of `key` with `f(current)`.
    ///
    /// Returning `None` from `f` removes the key.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StorageError>;

    /// Atomically read and remove a key.
    fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut taken = None;
        self.update(key, &mut |current| {
            taken = current;
            None
        })?;
        Ok(taken)
    }
}
