//! Persisted read/unread boundary for the notification feed.
//!
//! The acknowledged ids live under one key as a JSON array. The set only
//! grows until [`ReadStateTracker::clear`] is called.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ErrorContext, ResultExt, SyncError, SyncResult};
use crate::models::wire::value_to_string;
use crate::traits::KeyValueStore;

/// Store key holding the acknowledged notification ids.
pub const VIEWED_NOTIFICATIONS_KEY: &str = "viewedNotifications";

/// Tracks which notifications the user has acknowledged.
#[derive(Clone)]
pub struct ReadStateTracker {
    store: Arc<dyn KeyValueStore>,
}

impl ReadStateTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The acknowledged ids.
    ///
    /// A missing, unreadable or corrupt value reads as the empty set.
    pub fn read(&self) -> HashSet<String> {
        match self.store.get(VIEWED_NOTIFICATIONS_KEY) {
            Ok(Some(raw)) => decode_ids(&raw).into_iter().collect(),
            Ok(None) => HashSet::new(),
            Err(e) => {
                tracing::warn!("Failed to read notification read state: {}", e);
                HashSet::new()
            }
        }
    }

    /// Add `ids` to the acknowledged set. Ids already present are skipped.
    ///
    /// The union is one read-modify-write on the store.
    pub fn mark_all_read<I, S>(&self, ids: I) -> SyncResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let incoming: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut added = 0usize;

        self.store
            .update(VIEWED_NOTIFICATIONS_KEY, &mut |current| {
                let mut ids = current.as_deref().map(decode_ids).unwrap_or_default();
                let mut seen: HashSet<String> = ids.iter().cloned().collect();
                added = 0;
                for id in &incoming {
                    if seen.insert(id.clone()) {
                        ids.push(id.clone());
                        added += 1;
                    }
                }
                // Serializing a Vec<String> cannot fail.
                Some(serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string()))
            })
            .map_err(SyncError::from)
            .context(ErrorContext::new("mark_all_read").with_component("read_state"))?;

        tracing::debug!("Marked {} notification(s) as read", added);
        Ok(())
    }

    /// Forget every acknowledgement.
    pub fn clear(&self) -> SyncResult<()> {
        self.store
            .remove(VIEWED_NOTIFICATIONS_KEY)
            .map_err(SyncError::from)
            .context(ErrorContext::new("clear_read_state").with_component("read_state"))
    }
}

impl std::fmt::Debug for ReadStateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadStateTracker").finish_non_exhaustive()
    }
}

/// Decode the stored array. Numbers are accepted as ids; anything that is
/// not an array of scalars yields an empty list.
fn decode_ids(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(values) => values
            .iter()
            .map(value_to_string)
            .filter(|id| !id.is_empty())
            .collect(),
        Err(e) => {
            tracing::warn!("Ignoring corrupt {} value: {}", VIEWED_NOTIFICATIONS_KEY, e);
            Vec::new()
        }
    }
}
