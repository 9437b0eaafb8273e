//! Data model shared by the feed, chat session and carousel.

pub mod media;
pub mod message;
pub mod notification;
pub mod related;
pub(crate) mod wire;

pub use media::{valid_refs, MediaRef, MediaResolver};
pub use message::{
    created_message_id, parse_history, Message, MessageId, OutgoingMessage, Sender,
    ServerChatMessage,
};
pub use notification::{parse_notification_list, Notification, NotificationKind, ServerNotification};
pub use related::{parse_yearbook_images, RelatedContent, YearbookImage};
pub use wire::parse_timestamp;
