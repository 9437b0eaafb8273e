//! Server acknowledgements for optimistic sends and deletes.

use uuid::Uuid;

use super::{ChatSession, DeleteRequest};
use crate::error::SyncError;
use crate::models::MessageId;

/// Result of a create-message acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The pending message is now confirmed.
    Reconciled,
    /// The message was unsent while pending; delete the server copy.
    Orphaned(Option<DeleteRequest>),
    /// The token is neither in the session nor orphaned.
    Unknown,
}

impl ChatSession {
    /// Reconcile the optimistic message carrying `token`.
    ///
    /// Matches on the token handed out at send time, never on history.
    /// Without a server id the message keeps its pending token as identity.
    pub fn confirm_sent(&mut self, token: Uuid, server_id: Option<String>) -> ConfirmOutcome {
        if let Some(peer_id) = self.orphaned.remove(&token) {
            let request = server_id
                .filter(|id| !id.is_empty())
                .map(|message_id| DeleteRequest {
                    message_id,
                    peer_id,
                });
            match &request {
                Some(request) => tracing::debug!(
                    "Message {} was unsent while sending; deleting it on the server",
                    request.message_id
                ),
                None => tracing::warn!(
                    "Message unsent while sending was accepted without an id; server copy kept"
                ),
            }
            return ConfirmOutcome::Orphaned(request);
        }

        let pending = MessageId::Pending(token);
        let Some(message) = self.messages.iter_mut().find(|m| m.id == pending) else {
            tracing::debug!("Send acknowledgement for unknown message {}", pending);
            return ConfirmOutcome::Unknown;
        };

        message.pending = false;
        if let Some(id) = server_id.filter(|id| !id.is_empty()) {
            message.id = MessageId::Server(id);
        }
        tracing::debug!("Message {} confirmed", message.id);
        ConfirmOutcome::Reconciled
    }

    /// A create call failed. The message stays pending; there is no retry.
    pub fn send_failed(&mut self, token: Uuid, error: &SyncError) {
        self.orphaned.remove(&token);
        tracing::warn!(
            "Message {} not acknowledged, left pending: {}",
            MessageId::Pending(token),
            error
        );
    }

    /// A delete call failed. The local removal stands.
    pub fn delete_failed(&self, request: &DeleteRequest, error: &SyncError) {
        tracing::warn!(
            "Server delete of message {} failed, local removal kept: {}",
            request.message_id,
            error
        );
    }
}
