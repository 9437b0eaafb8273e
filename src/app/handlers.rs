//! Applying results of spawned requests.

use tracing::{debug, info, warn};

use crate::chat::{ConfirmOutcome, LoadOutcome};
use crate::error::SyncError;
use crate::notifications::IngestOutcome;

use super::{Engine, EngineMessage};

impl Engine {
    /// Apply one result posted by a spawned request.
    pub fn handle_message(&mut self, msg: EngineMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!("Handling {}", msg.name());

        match msg {
            EngineMessage::NotificationsLoaded {
                generation,
                notifications,
            } => match self.notifications.ingest_generation(generation, notifications) {
                IngestOutcome::Applied { count } => {
                    info!(
                        "Feed refreshed: {} notification(s), {} unread",
                        count,
                        self.notifications.unread_count()
                    );
                }
                IngestOutcome::Stale { .. } => {}
            },
            EngineMessage::NotificationsFailed { generation, error } => {
                if self.notifications.refresh_failed(generation, &error) {
                    self.record_error(&error);
                }
            }
            EngineMessage::HistoryLoaded {
                generation,
                peer_id,
                messages,
            } => {
                self.chat.apply_history(generation, &peer_id, Ok(messages));
            }
            EngineMessage::HistoryFailed {
                generation,
                peer_id,
                error,
            } => {
                let message = error.user_message();
                let outcome = self.chat.apply_history(generation, &peer_id, Err(error));
                if outcome == LoadOutcome::Failed {
                    self.last_error = Some(message);
                }
            }
            EngineMessage::MessageSent { token, server_id } => {
                if let ConfirmOutcome::Orphaned(Some(request)) =
                    self.chat.confirm_sent(token, server_id)
                {
                    self.spawn_delete(request);
                }
            }
            EngineMessage::MessageSendFailed { token, error } => {
                self.chat.send_failed(token, &error);
                self.record_error(&error);
            }
            EngineMessage::MessageDeleted { message_id } => {
                debug!("Server deleted message {}", message_id);
            }
            EngineMessage::MessageDeleteFailed { request, error } => {
                self.chat.delete_failed(&request, &error);
                self.record_error(&error);
            }
            EngineMessage::RelatedLoaded {
                generation,
                content,
            } => {
                if generation == self.selection_generation {
                    self.related = content;
                } else {
                    debug!("Discarding related content for superseded selection");
                }
            }
            EngineMessage::RelatedFailed { generation, error } => {
                if generation == self.selection_generation {
                    warn!("Failed to load related content: {}", error);
                    self.related = None;
                } else {
                    debug!("Ignoring related-content failure for superseded selection");
                }
            }
            EngineMessage::YearbookLoaded {
                generation,
                yearbook_id,
                images,
            } => {
                if generation != self.gallery_generation {
                    debug!("Discarding pages of yearbook {}: gallery changed", yearbook_id);
                    return;
                }
                if images.is_empty() {
                    info!("Yearbook {} has no images", yearbook_id);
                }
                self.carousel.set_source(images, 0);
            }
            EngineMessage::YearbookFailed {
                generation,
                yearbook_id,
                error,
            } => {
                if generation == self.gallery_generation {
                    warn!("Failed to load yearbook {}: {}", yearbook_id, error);
                    self.record_error(&error);
                }
            }
            EngineMessage::TaskFailed { reason } => {
                warn!("Background request failed: {}", reason);
                self.last_error = Some(format!("A background request failed: {}", reason));
            }
        }
    }

    fn record_error(&mut self, error: &SyncError) {
        self.last_error = Some(error.user_message());
    }
}
