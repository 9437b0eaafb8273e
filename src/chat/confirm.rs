//! Confirmation step in front of an unsend.

use crate::models::MessageId;

/// Holds the message the user asked to unsend until they confirm or cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsendConfirmation {
    target: Option<MessageId>,
}

impl UnsendConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for confirmation to unsend `id`, replacing any earlier request.
    pub fn request(&mut self, id: MessageId) {
        self.target = Some(id);
    }

    /// The message awaiting confirmation.
    pub fn pending(&self) -> Option<&MessageId> {
        self.target.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// The user confirmed: returns the message to unsend.
    pub fn confirm(&mut self) -> Option<MessageId> {
        self.target.take()
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }
}
