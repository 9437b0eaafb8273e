use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::wire::{lenient_string, parse_timestamp, value_to_string};

/// Identity of a chat message.
///
/// Optimistically sent messages carry a `Pending` token until the server
/// acknowledges them; the token is how the acknowledgement finds the message
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    Server(String),
    Pending(Uuid),
}

impl MessageId {
    /// A fresh pending token.
    pub fn new_pending() -> Self {
        MessageId::Pending(Uuid::new_v4())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MessageId::Pending(_))
    }

    /// The server-assigned id, if any.
    pub fn server_id(&self) -> Option<&str> {
        match self {
            MessageId::Server(id) => Some(id),
            MessageId::Pending(_) => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Server(id) => write!(f, "{}", id),
            MessageId::Pending(token) => write!(f, "pending-{}", token),
        }
    }
}

/// Who wrote a message, relative to the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Them,
}

/// A chat message as held by the open session.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    /// True between optimistic insertion and server acknowledgement.
    pub pending: bool,
}

impl Message {
    /// An optimistic outgoing message.
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new_pending(),
            sender: Sender::Me,
            text: text.into(),
            created_at: Some(Utc::now()),
            pending: true,
        }
    }
}

/// Message format from the history endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerChatMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub receiver_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

impl ServerChatMessage {
    /// Convert to a client Message from the point of view of `self_id`.
    pub fn to_client_message(self, self_id: &str) -> Message {
        let sender = if self.sender_id == self_id {
            Sender::Me
        } else {
            Sender::Them
        };

        Message {
            id: MessageId::Server(self.id),
            sender,
            text: self.message,
            created_at: parse_timestamp(&self.created_at),
            pending: false,
        }
    }
}

/// Body of a create-message request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
}

/// Decode a history response from the point of view of `self_id`.
///
/// A top-level value that is not an array is malformed; entries that are not
/// objects are skipped.
pub fn parse_history(value: Value, self_id: &str) -> Result<Vec<Message>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_value(value)?;
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<ServerChatMessage>(item).ok())
        .map(|raw| raw.to_client_message(self_id))
        .collect())
}

/// The id a create-message response assigns, if it carries one.
///
/// Accepts `{"id": ..}`, `{"message": {"id": ..}}` and `{"data": {"id": ..}}`.
pub fn created_message_id(body: &Value) -> Option<String> {
    [
        body.get("id"),
        body.get("message").and_then(|m| m.get("id")),
        body.get("data").and_then(|d| d.get("id")),
    ]
    .into_iter()
    .flatten()
    .map(value_to_string)
    .find(|id| !id.is_empty())
}
