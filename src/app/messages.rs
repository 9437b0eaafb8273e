//! EngineMessage enum for results coming back from spawned requests.

use uuid::Uuid;

use crate::chat::{DeleteRequest, LoadToken};
use crate::error::SyncError;
use crate::models::{Message, Notification, RelatedContent};
use crate::notifications::FeedGeneration;

/// Messages posted by spawned requests, applied one at a time by
/// [`super::Engine::handle_message`].
#[derive(Debug)]
pub enum EngineMessage {
    /// Feed refresh completed
    NotificationsLoaded {
        generation: FeedGeneration,
        notifications: Vec<Notification>,
    },
    /// Feed refresh failed
    NotificationsFailed {
        generation: FeedGeneration,
        error: SyncError,
    },
    /// History fetch for a chat session completed
    HistoryLoaded {
        generation: LoadToken,
        peer_id: String,
        messages: Vec<Message>,
    },
    /// History fetch failed
    HistoryFailed {
        generation: LoadToken,
        peer_id: String,
        error: SyncError,
    },
    /// Create-message call acknowledged
    MessageSent {
        token: Uuid,
        server_id: Option<String>,
    },
    /// Create-message call failed
    MessageSendFailed { token: Uuid, error: SyncError },
    /// Delete call acknowledged
    MessageDeleted { message_id: String },
    /// Delete call failed
    MessageDeleteFailed {
        request: DeleteRequest,
        error: SyncError,
    },
    /// Related post/event lookup completed
    RelatedLoaded {
        generation: u64,
        content: Option<RelatedContent>,
    },
    /// Related post/event lookup failed
    RelatedFailed { generation: u64, error: SyncError },
    /// Yearbook page list loaded
    YearbookLoaded {
        generation: u64,
        yearbook_id: String,
        images: Vec<String>,
    },
    /// Yearbook page list failed
    YearbookFailed {
        generation: u64,
        yearbook_id: String,
        error: SyncError,
    },
    /// A spawned request panicked or was cancelled before posting a result
    TaskFailed { reason: String },
}

impl EngineMessage {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EngineMessage::NotificationsLoaded { .. } => "NotificationsLoaded",
            EngineMessage::NotificationsFailed { .. } => "NotificationsFailed",
            EngineMessage::HistoryLoaded { .. } => "HistoryLoaded",
            EngineMessage::HistoryFailed { .. } => "HistoryFailed",
            EngineMessage::MessageSent { .. } => "MessageSent",
            EngineMessage::MessageSendFailed { .. } => "MessageSendFailed",
            EngineMessage::MessageDeleted { .. } => "MessageDeleted",
            EngineMessage::MessageDeleteFailed { .. } => "MessageDeleteFailed",
            EngineMessage::RelatedLoaded { .. } => "RelatedLoaded",
            EngineMessage::RelatedFailed { .. } => "RelatedFailed",
            EngineMessage::YearbookLoaded { .. } => "YearbookLoaded",
            EngineMessage::YearbookFailed { .. } => "YearbookFailed",
            EngineMessage::TaskFailed { .. } => "TaskFailed",
        }
    }
}
