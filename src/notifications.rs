//! Notification feed: server entries merged with locally injected ones.
//!
//! The feed is two ordered segments. Local injections (most recent first)
//! always come before the server segment, whatever their timestamps. A
//! server fetch replaces only the server segment. Read/unread is projected
//! from [`ReadStateTracker`] and is never stored on the entries themselves.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{SyncError, SyncResult};
use crate::injection::PendingInjection;
use crate::models::Notification;
use crate::read_state::ReadStateTracker;

/// Token identifying one feed refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedGeneration(u64);

impl FeedGeneration {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Result of applying a refresh response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The server segment was replaced with `count` entries.
    Applied { count: usize },
    /// A newer refresh was issued after this one; the response was dropped.
    Stale {
        generation: FeedGeneration,
        latest: FeedGeneration,
    },
}

/// A feed entry with its unread projection.
#[derive(Debug, Clone, Copy)]
pub struct FeedItem<'a> {
    pub notification: &'a Notification,
    pub unread: bool,
}

/// The user's notification feed.
#[derive(Debug)]
pub struct NotificationStore {
    read_state: ReadStateTracker,
    /// Locally injected entries, most recent first.
    local: Vec<Notification>,
    /// Server entries in server order.
    server: Vec<Notification>,
    /// Ids acknowledged in this process, kept even if persisting them failed.
    acknowledged: HashSet<String>,
    latest_generation: u64,
}

impl NotificationStore {
    pub fn new(read_state: ReadStateTracker) -> Self {
        Self {
            read_state,
            local: Vec::new(),
            server: Vec::new(),
            acknowledged: HashSet::new(),
            latest_generation: 0,
        }
    }

    /// Feed entries in display order.
    pub fn feed(&self) -> impl Iterator<Item = &Notification> {
        self.local.iter().chain(self.server.iter())
    }

    /// Ids of the feed entries in display order.
    pub fn feed_ids(&self) -> Vec<String> {
        self.feed().map(|n| n.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.local.len() + self.server.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.feed().find(|n| n.id == id)
    }

    /// Replace the server segment with `server_list`.
    ///
    /// Duplicate ids keep their first occurrence; entries without an id are
    /// dropped. Returns the number of server entries kept.
    pub fn ingest(&mut self, server_list: Vec<Notification>) -> usize {
        let received = server_list.len();
        let mut seen = HashSet::new();
        let server: Vec<Notification> = server_list
            .into_iter()
            .filter(|n| !n.id.is_empty() && seen.insert(n.id.clone()))
            .collect();

        if server.len() != received {
            tracing::debug!(
                "Dropped {} duplicate or id-less notification(s)",
                received - server.len()
            );
        }

        self.server = server;
        tracing::debug!(
            "Feed now has {} local + {} server notification(s)",
            self.local.len(),
            self.server.len()
        );
        self.server.len()
    }

    /// Start a refresh. Only the response for the latest generation is applied.
    pub fn begin_refresh(&mut self) -> FeedGeneration {
        self.latest_generation += 1;
        FeedGeneration(self.latest_generation)
    }

    /// Apply a refresh response if no newer refresh has started since.
    pub fn ingest_generation(
        &mut self,
        generation: FeedGeneration,
        server_list: Vec<Notification>,
    ) -> IngestOutcome {
        let latest = FeedGeneration(self.latest_generation);
        if generation != latest {
            tracing::debug!(
                "Discarding stale feed response (generation {}, latest {})",
                generation.0,
                latest.0
            );
            return IngestOutcome::Stale { generation, latest };
        }

        IngestOutcome::Applied {
            count: self.ingest(server_list),
        }
    }

    /// Record a failed refresh. The feed is left untouched.
    ///
    /// Returns whether the failure belongs to the latest refresh.
    pub fn refresh_failed(&self, generation: FeedGeneration, error: &SyncError) -> bool {
        let current = generation.0 == self.latest_generation;
        if current {
            tracing::warn!("Notification refresh failed: {}", error);
        } else {
            tracing::debug!(
                "Ignoring failure of superseded feed refresh {}: {}",
                generation.0,
                error
            );
        }
        current
    }

    /// Put `notification` at the head of the feed under a synthetic id.
    ///
    /// Returns the synthetic id.
    pub fn inject_local(&mut self, mut notification: Notification) -> String {
        let id = format!("local-{}", Uuid::new_v4());
        notification.id = id.clone();
        self.local.insert(0, notification);
        tracing::debug!("Injected local notification {}", id);
        id
    }

    /// Take the pending one-shot injection, if any, and inject it.
    pub fn inject_pending(&mut self, channel: &PendingInjection) -> Option<String> {
        channel.take().map(|n| self.inject_local(n))
    }

    fn read_ids(&self) -> HashSet<String> {
        let mut read = self.read_state.read();
        read.extend(self.acknowledged.iter().cloned());
        read
    }

    /// `|feed| − |feed ∩ read|`.
    pub fn unread_count(&self) -> usize {
        let read = self.read_ids();
        self.feed().filter(|n| !read.contains(&n.id)).count()
    }

    pub fn is_unread(&self, id: &str) -> bool {
        self.get(id).is_some() && !self.read_ids().contains(id)
    }

    /// Feed entries paired with their unread flag.
    pub fn items(&self) -> Vec<FeedItem<'_>> {
        let read = self.read_ids();
        self.feed()
            .map(|n| FeedItem {
                notification: n,
                unread: !read.contains(&n.id),
            })
            .collect()
    }

    /// Mark every entry currently in the feed as read.
    ///
    /// Entries that arrive afterwards are unread until the next call. The
    /// in-memory projection drops to zero even if persisting fails; the
    /// error is still returned.
    pub fn acknowledge(&mut self) -> SyncResult<usize> {
        let snapshot = self.feed_ids();
        let count = snapshot.len();
        self.acknowledged.extend(snapshot.iter().cloned());
        self.read_state.mark_all_read(snapshot)?;
        tracing::info!("Acknowledged {} notification(s)", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryStore;
    use crate::error::NetworkError;
    use crate::models::{NotificationKind, ServerNotification};
    use std::sync::Arc;

    fn notif(id: &str) -> Notification {
        ServerNotification {
            id: id.to_string(),
            kind: "post".to_string(),
            first_name: "Sam".to_string(),
            message: format!("notification {}", id),
            ..Default::default()
        }
        .to_client_notification()
    }

    fn store() -> (NotificationStore, InMemoryStore) {
        let kv = InMemoryStore::new();
        let tracker = ReadStateTracker::new(Arc::new(kv.clone()));
        (NotificationStore::new(tracker), kv)
    }

    #[test]
    fn test_ingest_dedups_and_keeps_order() {
        let (mut feed, _) = store();
        let count = feed.ingest(vec![notif("3"), notif("2"), notif("3"), notif(""), notif("1")]);
        assert_eq!(count, 3);
        assert_eq!(feed.feed_ids(), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_local_entries_precede_server_entries() {
        let (mut feed, _) = store();
        let local_id = feed.inject_local(notif("ignored"));
        feed.ingest(vec![notif("a"), notif("b")]);

        assert!(local_id.starts_with("local-"));
        assert_eq!(feed.feed_ids(), vec![local_id.clone(), "a".to_string(), "b".to_string()]);

        feed.ingest(vec![notif("c")]);
        assert_eq!(feed.feed_ids(), vec![local_id, "c".to_string()]);
    }

    #[test]
    fn test_newest_injection_first() {
        let (mut feed, _) = store();
        let first = feed.inject_local(notif("x"));
        let second = feed.inject_local(notif("y"));
        assert_eq!(feed.feed_ids(), vec![second, first]);
    }

    #[test]
    fn test_acknowledge_boundary() {
        let (mut feed, _) = store();
        feed.ingest(vec![notif("1"), notif("2")]);
        assert_eq!(feed.unread_count(), 2);

        feed.acknowledge().unwrap();
        assert_eq!(feed.unread_count(), 0);

        feed.ingest(vec![notif("3"), notif("1"), notif("2")]);
        assert_eq!(feed.unread_count(), 1);
        assert!(feed.is_unread("3"));
        assert!(!feed.is_unread("1"));
    }

    #[test]
    fn test_acknowledge_persists_across_instances() {
        let (mut feed, kv) = store();
        feed.ingest(vec![notif("1")]);
        feed.acknowledge().unwrap();

        let mut reloaded = NotificationStore::new(ReadStateTracker::new(Arc::new(kv)));
        reloaded.ingest(vec![notif("1"), notif("2")]);
        assert_eq!(reloaded.unread_count(), 1);
    }

    #[test]
    fn test_acknowledge_write_failure_still_resets_projection() {
        let (mut feed, kv) = store();
        feed.ingest(vec![notif("1")]);
        kv.set_write_should_fail(true);

        assert!(feed.acknowledge().is_err());
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let (mut feed, _) = store();
        let first = feed.begin_refresh();
        let second = feed.begin_refresh();

        let outcome = feed.ingest_generation(second, vec![notif("new")]);
        assert_eq!(outcome, IngestOutcome::Applied { count: 1 });

        let outcome = feed.ingest_generation(first, vec![notif("old")]);
        assert_eq!(
            outcome,
            IngestOutcome::Stale {
                generation: first,
                latest: second
            }
        );
        assert_eq!(feed.feed_ids(), vec!["new"]);
    }

    #[test]
    fn test_refresh_failure_leaves_feed() {
        let (mut feed, _) = store();
        feed.ingest(vec![notif("1")]);
        let generation = feed.begin_refresh();
        let err = SyncError::Fetch(NetworkError::Other {
            message: "offline".to_string(),
        });

        assert!(feed.refresh_failed(generation, &err));
        assert_eq!(feed.feed_ids(), vec!["1"]);

        let newer = feed.begin_refresh();
        assert!(!feed.refresh_failed(generation, &err));
        assert!(feed.refresh_failed(newer, &err));
    }

    #[test]
    fn test_inject_pending_consumes_slot() {
        let (mut feed, kv) = store();
        let channel = PendingInjection::new(Arc::new(kv));
        channel
            .publish(&Notification::new(NotificationKind::Post, "Me", "you posted"))
            .unwrap();

        let id = feed.inject_pending(&channel).unwrap();
        assert_eq!(feed.get(&id).unwrap().message, "you posted");
        assert!(feed.inject_pending(&channel).is_none());
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_items_projection() {
        let (mut feed, _) = store();
        feed.ingest(vec![notif("1")]);
        feed.acknowledge().unwrap();
        feed.ingest(vec![notif("2"), notif("1")]);

        let flags: Vec<(String, bool)> = feed
            .items()
            .iter()
            .map(|item| (item.notification.id.clone(), item.unread))
            .collect();
        assert_eq!(flags, vec![("2".to_string(), true), ("1".to_string(), false)]);
    }
}
