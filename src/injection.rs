//! One-shot channel for locally generated notifications.
//!
//! A screen that completes a user action (for example creating a post)
//! publishes a notification into a single persisted slot. The feed takes it
//! the next time it loads; taking empties the slot, so each publish is
//! injected exactly once, even across a reload in between.

use std::sync::Arc;

use crate::error::{ErrorContext, ResultExt, StorageError, SyncError, SyncResult};
use crate::models::{Notification, ServerNotification};
use crate::traits::KeyValueStore;

/// Store key of the pending-injection slot.
pub const PENDING_INJECTION_KEY: &str = "newPostNotif";

/// Single-slot persisted channel holding at most one notification.
#[derive(Clone)]
pub struct PendingInjection {
    store: Arc<dyn KeyValueStore>,
}

impl PendingInjection {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Put `notification` in the slot, replacing anything not yet taken.
    pub fn publish(&self, notification: &Notification) -> SyncResult<()> {
        let json = serde_json::to_string(&notification.to_server()).map_err(|source| {
            SyncError::from(StorageError::Encode {
                key: PENDING_INJECTION_KEY.to_string(),
                source,
            })
        })?;

        self.store
            .set(PENDING_INJECTION_KEY, &json)
            .map_err(SyncError::from)
            .context(ErrorContext::new("publish_injection").with_component("injection"))?;

        tracing::debug!("Published pending notification injection");
        Ok(())
    }

    /// Remove and return the pending notification, if any.
    ///
    /// The slot is cleared even when its content cannot be decoded.
    pub fn take(&self) -> Option<Notification> {
        let raw = match self.store.take(PENDING_INJECTION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to take pending notification: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<ServerNotification>(&raw) {
            Ok(server) => Some(server.to_client_notification()),
            Err(e) => {
                tracing::warn!("Dropping undecodable pending notification: {}", e);
                None
            }
        }
    }

    /// Whether a notification is waiting in the slot.
    pub fn is_pending(&self) -> bool {
        matches!(self.store.get(PENDING_INJECTION_KEY), Ok(Some(_)))
    }
}

impl std::fmt::Debug for PendingInjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingInjection").finish_non_exhaustive()
    }
}
