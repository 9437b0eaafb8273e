//! The engine driving every component.
//!
//! [`Engine`] owns the feed, the chat session, the unsend confirmation and
//! the carousel. User actions (see `actions.rs`) mutate state immediately
//! and spawn the network call; the spawned task posts an [`EngineMessage`]
//! back, and [`Engine::handle_message`] applies it. State is only ever
//! touched from the task that owns the engine.

mod actions;
mod handlers;
mod messages;

pub use messages::EngineMessage;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::carousel::ImageCarousel;
use crate::chat::{ChatSession, UnsendConfirmation};
use crate::config::SyncConfig;
use crate::injection::PendingInjection;
use crate::models::{MediaResolver, Notification, RelatedContent};
use crate::notifications::NotificationStore;
use crate::read_state::ReadStateTracker;
use crate::traits::{HttpClient, KeyValueStore};

/// Notification feed, chat and media viewer for one signed-in user.
pub struct Engine {
    pub notifications: NotificationStore,
    pub chat: ChatSession,
    pub unsend_confirmation: UnsendConfirmation,
    pub carousel: ImageCarousel,
    injection: PendingInjection,
    api: ApiClient,
    resolver: MediaResolver,
    /// Id of the notification whose details are shown
    selected: Option<String>,
    /// Post or event behind the selected notification
    related: Option<RelatedContent>,
    selection_generation: u64,
    gallery_generation: u64,
    /// Last failure worth showing to the user
    last_error: Option<String>,
    message_tx: mpsc::UnboundedSender<EngineMessage>,
    message_rx: mpsc::UnboundedReceiver<EngineMessage>,
    in_flight: usize,
}

impl Engine {
    pub fn new(
        config: &SyncConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let self_id = config.user_id.clone().unwrap_or_default();

        Self {
            notifications: NotificationStore::new(ReadStateTracker::new(Arc::clone(&store))),
            chat: ChatSession::new(self_id),
            unsend_confirmation: UnsendConfirmation::new(),
            carousel: ImageCarousel::new(),
            injection: PendingInjection::new(store),
            api: ApiClient::new(http, config),
            resolver: config.media_resolver(),
            selected: None,
            related: None,
            selection_generation: 0,
            gallery_generation: 0,
            last_error: None,
            message_tx,
            message_rx,
            in_flight: 0,
        }
    }

    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    pub fn injection(&self) -> &PendingInjection {
        &self.injection
    }

    pub fn selected_notification(&self) -> Option<&Notification> {
        self.selected
            .as_deref()
            .and_then(|id| self.notifications.get(id))
    }

    pub fn related_content(&self) -> Option<&RelatedContent> {
        self.related.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Number of spawned requests whose result has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Run `request` on the runtime and post its result back.
    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = EngineMessage> + Send + 'static,
    {
        let tx = self.message_tx.clone();
        self.in_flight += 1;
        let handle = tokio::spawn(request);
        tokio::spawn(async move {
            // A request that panics still reports back, so in_flight settles.
            let msg = match handle.await {
                Ok(msg) => msg,
                Err(e) => EngineMessage::TaskFailed {
                    reason: e.to_string(),
                },
            };
            if tx.send(msg).is_err() {
                tracing::debug!("Engine dropped before request completed");
            }
        });
    }

    /// Wait for the next result and apply it.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.message_rx.recv().await {
            Some(msg) => {
                self.handle_message(msg);
                true
            }
            None => false,
        }
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn process_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.message_rx.try_recv() {
            self.handle_message(msg);
            applied += 1;
        }
        applied
    }

    /// Apply results until no request is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.process_next().await {}
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("notifications", &self.notifications.len())
            .field("chat", &self.chat.state())
            .field("carousel", &self.carousel.len())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryStore, MockHttpClient};
    use std::time::Duration;

    fn engine() -> Engine {
        Engine::new(
            &SyncConfig::new(),
            Arc::new(MockHttpClient::new()),
            Arc::new(InMemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_panicking_request_settles_in_flight() {
        let mut engine = engine();
        engine.spawn(async {
            if true {
                panic!("request blew up");
            }
            EngineMessage::MessageDeleted {
                message_id: "1".to_string(),
            }
        });
        assert_eq!(engine.in_flight(), 1);

        tokio::time::timeout(Duration::from_secs(5), engine.run_until_idle())
            .await
            .expect("engine should settle after a panicked request");

        assert_eq!(engine.in_flight(), 0);
        assert!(engine.last_error().unwrap().contains("background request"));
    }

    #[tokio::test]
    async fn test_process_next_without_work() {
        let mut engine = engine();
        assert!(!engine.process_next().await);
        assert_eq!(engine.process_ready(), 0);
    }
}
