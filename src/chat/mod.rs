//! The open conversation.
//!
//! A [`ChatSession`] is a synchronous state machine. It never performs I/O:
//! operations that need the network return a request value (history, send,
//! delete) for the caller to execute, and the result is fed back through
//! [`ChatSession::apply_history`] or the reconciliation methods.
//!
//! Every `open` and `close` bumps the load generation. A history response is
//! applied only while its generation and peer are still current, so a slow
//! load for a previous conversation can never overwrite a newer one.

pub mod confirm;
mod reconciliation;

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::SyncError;
use crate::models::{Message, MessageId, OutgoingMessage};

pub use confirm::UnsendConfirmation;
pub use reconciliation::ConfirmOutcome;

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Loading,
    Ready,
}

/// Generation of a history load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// History fetch the caller must perform after [`ChatSession::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub generation: LoadToken,
    pub self_id: String,
    pub peer_id: String,
}

/// Result of feeding a history response back into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Messages replaced; the session is ready.
    Applied { count: usize },
    /// The response belongs to a superseded load and was dropped.
    Stale {
        generation: LoadToken,
        current: LoadToken,
    },
    /// The fetch failed; the session is ready with an empty history.
    Failed,
}

/// Create-message call for an optimistic send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Pending token of the optimistic message.
    pub token: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
}

impl SendRequest {
    pub fn body(&self) -> OutgoingMessage {
        OutgoingMessage {
            sender_id: self.sender_id.clone(),
            receiver_id: self.receiver_id.clone(),
            message: self.text.clone(),
        }
    }
}

/// Delete call for an unsent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub message_id: String,
    pub peer_id: String,
}

/// What `unsend` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsendOutcome {
    /// Removed locally; the server copy must be deleted.
    Deleted(DeleteRequest),
    /// Removed a message still being sent. The server copy, if the send
    /// still succeeds, is deleted once its id is known.
    RemovedPending,
    /// Removed a message the server accepted without reporting an id.
    /// There is nothing to address a delete to, so the server copy stays.
    RemovedLocalOnly,
    /// No such message in the session.
    NotFound,
}

/// The single live conversation.
#[derive(Debug)]
pub struct ChatSession {
    self_id: String,
    peer_id: Option<String>,
    state: SessionState,
    messages: Vec<Message>,
    load_token: u64,
    /// Tokens of messages unsent before the server acknowledged them, with
    /// the peer they were sent to. Kept across `open` and `close`: the
    /// acknowledgement may arrive after the user left the conversation.
    orphaned: HashMap<Uuid, String>,
}

impl ChatSession {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            peer_id: None,
            state: SessionState::Closed,
            messages: Vec::new(),
            load_token: 0,
            orphaned: HashMap::new(),
        }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn peer_id(&self) -> Option<&str> {
        self.peer_id.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn load_token(&self) -> LoadToken {
        LoadToken(self.load_token)
    }

    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    fn bump_generation(&mut self) -> LoadToken {
        self.load_token += 1;
        LoadToken(self.load_token)
    }

    /// Switch to `peer_id` and start loading its history.
    pub fn open(&mut self, peer_id: impl Into<String>) -> HistoryRequest {
        let peer_id = peer_id.into();
        let generation = self.bump_generation();

        self.peer_id = Some(peer_id.clone());
        self.messages.clear();
        self.state = SessionState::Loading;

        tracing::debug!(
            "Chat session loading peer {} (generation {})",
            peer_id,
            generation.0
        );

        HistoryRequest {
            generation,
            self_id: self.self_id.clone(),
            peer_id,
        }
    }

    /// Apply a history response for the load identified by `generation`.
    pub fn apply_history(
        &mut self,
        generation: LoadToken,
        peer_id: &str,
        result: Result<Vec<Message>, SyncError>,
    ) -> LoadOutcome {
        let current = self.load_token();
        if generation != current || self.peer_id.as_deref() != Some(peer_id) {
            tracing::debug!(
                "Discarding stale history for peer {} (generation {}, current {})",
                peer_id,
                generation.0,
                current.0
            );
            return LoadOutcome::Stale {
                generation,
                current,
            };
        }

        self.state = SessionState::Ready;
        match result {
            Ok(mut messages) => {
                sort_ascending(&mut messages);
                let count = messages.len();
                self.messages = messages;
                tracing::debug!("Loaded {} message(s) with peer {}", count, peer_id);
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                tracing::warn!("Failed to load history with peer {}: {}", peer_id, e);
                self.messages.clear();
                LoadOutcome::Failed
            }
        }
    }

    /// Optimistically append `text` and return the create call to make.
    ///
    /// Returns `None` when the session is not ready or `text` is blank.
    pub fn send(&mut self, text: &str) -> Option<SendRequest> {
        if self.state != SessionState::Ready {
            tracing::debug!("Ignoring send while session is {:?}", self.state);
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }
        let peer_id = self.peer_id.clone()?;

        let token = Uuid::new_v4();
        self.messages.push(Message {
            id: MessageId::Pending(token),
            ..Message::outgoing(text)
        });

        Some(SendRequest {
            token,
            sender_id: self.self_id.clone(),
            receiver_id: peer_id,
            text: text.to_string(),
        })
    }

    /// Remove a message. Call only after the user confirmed the unsend.
    ///
    /// The removal is not rolled back if the delete call later fails.
    pub fn unsend(&mut self, id: &MessageId) -> UnsendOutcome {
        let Some(index) = self.messages.iter().position(|m| &m.id == id) else {
            tracing::debug!("Unsend of {} ignored: not in session", id);
            return UnsendOutcome::NotFound;
        };
        let removed = self.messages.remove(index);
        let peer_id = self.peer_id.clone().unwrap_or_default();

        match id {
            MessageId::Server(message_id) => UnsendOutcome::Deleted(DeleteRequest {
                message_id: message_id.clone(),
                peer_id,
            }),
            MessageId::Pending(token) if removed.pending => {
                self.orphaned.insert(*token, peer_id);
                UnsendOutcome::RemovedPending
            }
            MessageId::Pending(_) => {
                tracing::warn!(
                    "Message {} was accepted without a server id; removed locally only",
                    id
                );
                UnsendOutcome::RemovedLocalOnly
            }
        }
    }

    /// Leave the conversation. In-flight loads become stale.
    pub fn close(&mut self) {
        self.bump_generation();
        self.state = SessionState::Closed;
        self.peer_id = None;
        self.messages.clear();
        tracing::debug!("Chat session closed");
    }
}

/// Order by timestamp when every message has one; otherwise keep server order.
fn sort_ascending(messages: &mut [Message]) {
    if messages.iter().all(|m| m.created_at.is_some()) {
        messages.sort_by_key(|m| m.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sender, ServerChatMessage};

    fn history(ids: &[(&str, &str)]) -> Vec<Message> {
        ids.iter()
            .map(|(id, ts)| {
                ServerChatMessage {
                    id: id.to_string(),
                    sender_id: "peer".to_string(),
                    receiver_id: "me".to_string(),
                    message: format!("msg {}", id),
                    created_at: ts.to_string(),
                }
                .to_client_message("me")
            })
            .collect()
    }

    fn ready_session(peer: &str) -> ChatSession {
        let mut session = ChatSession::new("me");
        let req = session.open(peer);
        session.apply_history(req.generation, peer, Ok(Vec::new()));
        session
    }

    #[test]
    fn test_open_enters_loading() {
        let mut session = ChatSession::new("me");
        assert_eq!(session.state(), SessionState::Closed);

        let req = session.open("A");
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(req.self_id, "me");
        assert_eq!(req.peer_id, "A");
        assert_eq!(req.generation, session.load_token());
    }

    #[test]
    fn test_apply_history_sorts_ascending() {
        let mut session = ChatSession::new("me");
        let req = session.open("A");
        let outcome = session.apply_history(
            req.generation,
            "A",
            Ok(history(&[
                ("2", "2024-01-02T00:00:00Z"),
                ("1", "2024-01-01T00:00:00Z"),
            ])),
        );

        assert_eq!(outcome, LoadOutcome::Applied { count: 2 });
        assert!(session.is_ready());
        let ids: Vec<String> = session.messages().iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(session.messages()[0].sender, Sender::Them);
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut session = ChatSession::new("me");
        let a = session.open("A");
        let b = session.open("B");

        let outcome = session.apply_history(
            b.generation,
            "B",
            Ok(history(&[("b1", "2024-01-01T00:00:00Z")])),
        );
        assert_eq!(outcome, LoadOutcome::Applied { count: 1 });

        let outcome = session.apply_history(
            a.generation,
            "A",
            Ok(history(&[("a1", "2024-01-01T00:00:00Z")])),
        );
        assert!(matches!(outcome, LoadOutcome::Stale { .. }));
        assert_eq!(session.peer_id(), Some("B"));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id, MessageId::Server("b1".to_string()));
    }

    #[test]
    fn test_history_after_close_is_stale() {
        let mut session = ChatSession::new("me");
        let req = session.open("A");
        session.close();

        let outcome = session.apply_history(req.generation, "A", Ok(history(&[("1", "")])));
        assert!(matches!(outcome, LoadOutcome::Stale { .. }));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_failed_history_is_ready_and_empty() {
        let mut session = ChatSession::new("me");
        let req = session.open("A");
        let err = SyncError::Config {
            message: "boom".to_string(),
        };

        assert_eq!(session.apply_history(req.generation, "A", Err(err)), LoadOutcome::Failed);
        assert!(session.is_ready());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_send_is_optimistic() {
        let mut session = ready_session("A");
        let req = session.send("hello").unwrap();

        assert_eq!(req.sender_id, "me");
        assert_eq!(req.receiver_id, "A");
        assert_eq!(req.text, "hello");

        let last = session.messages().last().unwrap();
        assert!(last.pending);
        assert_eq!(last.sender, Sender::Me);
        assert_eq!(last.id, MessageId::Pending(req.token));
    }

    #[test]
    fn test_send_rejects_blank_and_not_ready() {
        let mut session = ready_session("A");
        assert!(session.send("   \n").is_none());
        assert!(session.messages().is_empty());

        session.open("B");
        assert!(session.send("hi").is_none());

        let mut closed = ChatSession::new("me");
        assert!(closed.send("hi").is_none());
    }

    #[test]
    fn test_send_appends_at_tail() {
        let mut session = ChatSession::new("me");
        let req = session.open("A");
        session.apply_history(
            req.generation,
            "A",
            Ok(history(&[("1", "2030-01-01T00:00:00Z")])),
        );

        session.send("later").unwrap();
        assert_eq!(session.messages().len(), 2);
        assert!(session.messages()[1].pending);
    }

    #[test]
    fn test_unsend_twice_is_noop() {
        let mut session = ChatSession::new("me");
        let req = session.open("A");
        session.apply_history(req.generation, "A", Ok(history(&[("7", ""), ("8", "")])));

        let id = MessageId::Server("7".to_string());
        let first = session.unsend(&id);
        assert_eq!(
            first,
            UnsendOutcome::Deleted(DeleteRequest {
                message_id: "7".to_string(),
                peer_id: "A".to_string(),
            })
        );
        assert_eq!(session.unsend(&id), UnsendOutcome::NotFound);
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_unsend_pending_issues_no_delete() {
        let mut session = ready_session("A");
        let req = session.send("oops").unwrap();

        let outcome = session.unsend(&MessageId::Pending(req.token));
        assert_eq!(outcome, UnsendOutcome::RemovedPending);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_open_clears_previous_messages() {
        let mut session = ready_session("A");
        session.send("hi").unwrap();
        session.open("B");
        assert!(session.messages().is_empty());
        assert_eq!(session.state(), SessionState::Loading);
    }
}
