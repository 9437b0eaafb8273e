//! User actions on the engine.
//!
//! Each action updates local state first and then spawns the network call,
//! if any. Results come back through [`EngineMessage`].

use tracing::{debug, info};

use crate::chat::{DeleteRequest, UnsendOutcome};
use crate::error::{SyncError, SyncResult};
use crate::models::{valid_refs, MessageId, Notification};

use super::{Engine, EngineMessage};

impl Engine {
    /// Pick up a pending local injection and fetch the server feed.
    pub fn refresh_notifications(&mut self) {
        if let Some(id) = self.notifications.inject_pending(&self.injection) {
            info!("Showing locally published notification {}", id);
        }

        let generation = self.notifications.begin_refresh();
        let api = self.api.clone();
        self.spawn(async move {
            match api.fetch_notifications().await {
                Ok(notifications) => EngineMessage::NotificationsLoaded {
                    generation,
                    notifications,
                },
                Err(error) => EngineMessage::NotificationsFailed { generation, error },
            }
        });
    }

    /// Mark everything currently in the feed as read.
    pub fn acknowledge(&mut self) -> SyncResult<usize> {
        self.notifications.acknowledge()
    }

    /// Publish a notification about the user's own action. It shows up at
    /// the head of the feed on the next refresh, exactly once.
    pub fn publish_local(&self, notification: &Notification) -> SyncResult<()> {
        self.injection.publish(notification)
    }

    /// Select a notification and look up the post or event behind it.
    ///
    /// Returns `false` if the id is not in the feed.
    pub fn select_notification(&mut self, id: &str) -> bool {
        let Some(notification) = self.notifications.get(id) else {
            return false;
        };
        let kind = notification.kind;
        let related_id = notification.related_id.clone();

        self.selection_generation += 1;
        self.selected = Some(id.to_string());
        self.related = None;

        if !kind.has_related_content() || related_id.is_empty() {
            return true;
        }

        let generation = self.selection_generation;
        let api = self.api.clone();
        self.spawn(async move {
            match api.fetch_related(kind, &related_id).await {
                Ok(content) => EngineMessage::RelatedLoaded {
                    generation,
                    content,
                },
                Err(error) => EngineMessage::RelatedFailed { generation, error },
            }
        });
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection_generation += 1;
        self.selected = None;
        self.related = None;
    }

    /// Open the conversation with `peer_id`.
    pub fn open_chat(&mut self, peer_id: &str) -> SyncResult<()> {
        if self.chat.self_id().is_empty() {
            return Err(SyncError::Config {
                message: "cannot open a chat without a user id".to_string(),
            });
        }

        self.unsend_confirmation.cancel();
        let request = self.chat.open(peer_id);
        let api = self.api.clone();
        self.spawn(async move {
            match api.fetch_history(&request.self_id, &request.peer_id).await {
                Ok(messages) => EngineMessage::HistoryLoaded {
                    generation: request.generation,
                    peer_id: request.peer_id,
                    messages,
                },
                Err(error) => EngineMessage::HistoryFailed {
                    generation: request.generation,
                    peer_id: request.peer_id,
                    error,
                },
            }
        });
        Ok(())
    }

    pub fn close_chat(&mut self) {
        self.unsend_confirmation.cancel();
        self.chat.close();
    }

    /// Send `text` in the open conversation.
    ///
    /// Returns the pending id of the optimistic message, or `None` when the
    /// session is not ready or the text is blank.
    pub fn send_message(&mut self, text: &str) -> Option<MessageId> {
        let request = self.chat.send(text)?;
        let token = request.token;
        let api = self.api.clone();
        self.spawn(async move {
            match api.send_message(&request.body()).await {
                Ok(server_id) => EngineMessage::MessageSent {
                    token: request.token,
                    server_id,
                },
                Err(error) => EngineMessage::MessageSendFailed {
                    token: request.token,
                    error,
                },
            }
        });
        Some(MessageId::Pending(token))
    }

    /// Ask the user to confirm unsending `id`.
    pub fn request_unsend(&mut self, id: MessageId) -> bool {
        if self.chat.find(&id).is_none() {
            return false;
        }
        self.unsend_confirmation.request(id);
        true
    }

    /// The user confirmed: remove the message and delete it on the server.
    pub fn confirm_unsend(&mut self) -> UnsendOutcome {
        let Some(id) = self.unsend_confirmation.confirm() else {
            return UnsendOutcome::NotFound;
        };

        let outcome = self.chat.unsend(&id);
        if let UnsendOutcome::Deleted(request) = &outcome {
            self.spawn_delete(request.clone());
        }
        outcome
    }

    pub fn cancel_unsend(&mut self) {
        self.unsend_confirmation.cancel();
    }

    pub(super) fn spawn_delete(&mut self, request: DeleteRequest) {
        let api = self.api.clone();
        self.spawn(async move {
            match api.delete_message(&request.message_id).await {
                Ok(()) => EngineMessage::MessageDeleted {
                    message_id: request.message_id,
                },
                Err(error) => EngineMessage::MessageDeleteFailed { request, error },
            }
        });
    }

    /// Load a yearbook's pages into the carousel.
    pub fn open_yearbook(&mut self, yearbook_id: &str) {
        self.gallery_generation += 1;
        self.carousel.close();

        let generation = self.gallery_generation;
        let yearbook_id = yearbook_id.to_string();
        let api = self.api.clone();
        self.spawn(async move {
            match api.fetch_yearbook_images(&yearbook_id).await {
                Ok(images) => EngineMessage::YearbookLoaded {
                    generation,
                    yearbook_id,
                    images,
                },
                Err(error) => EngineMessage::YearbookFailed {
                    generation,
                    yearbook_id,
                    error,
                },
            }
        });
    }

    /// Show `refs` in the carousel starting at the image the user picked.
    ///
    /// Blank references are dropped; `start` indexes into `refs` and moves
    /// to the next valid image if it points at a blank one. Returns whether
    /// the carousel opened.
    pub fn open_preview<S: AsRef<str>>(&mut self, refs: &[S], start: usize) -> bool {
        self.gallery_generation += 1;

        let images = valid_refs(refs);
        if images.is_empty() {
            debug!("Nothing to preview");
            self.carousel.close();
            return false;
        }

        let start = valid_refs(&refs[..start.min(refs.len())]).len();
        self.carousel.set_source(images, start);
        true
    }

    /// The current carousel image, resolved for display.
    pub fn current_image(&self) -> Option<String> {
        self.carousel.current_resolved(&self.resolver)
    }

    pub fn report_broken_image(&mut self, index: usize) {
        self.carousel.report_broken(index);
    }

    pub fn close_gallery(&mut self) {
        self.gallery_generation += 1;
        self.carousel.close();
    }
}
