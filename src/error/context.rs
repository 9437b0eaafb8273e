//! Error context for enriched error information.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Chat peer if the error occurred inside a conversation.
    pub peer_id: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            peer_id: None,
            timestamp: Utc::now(),
            component: None,
        }
    }

    /// Set the chat peer for this context.
    pub fn with_peer_id(mut self, peer_id: impl Into<String>) -> Self {
        self.peer_id = Some(peer_id.into());
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref peer_id) = self.peer_id {
            parts.push(format!("peer_id={}", peer_id));
        }

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref peer_id) = self.peer_id {
            write!(f, " peer={}", peer_id)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = ErrorContext::new("send_message")
            .with_peer_id("42")
            .with_component("chat");

        assert_eq!(ctx.operation, "send_message");
        assert_eq!(ctx.peer_id.as_deref(), Some("42"));
        assert_eq!(ctx.component.as_deref(), Some("chat"));
    }

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("load_history").with_peer_id("7");
        assert_eq!(ctx.to_string(), "[load_history] peer=7");

        let ctx = ErrorContext::new("refresh");
        assert_eq!(ctx.to_string(), "[refresh]");
    }

    #[test]
    fn test_log_string_contains_fields() {
        let ctx = ErrorContext::new("delete_message").with_component("api");
        let log = ctx.to_log_string();
        assert!(log.contains("operation=delete_message"));
        assert!(log.contains("component=api"));
        assert!(log.contains("timestamp="));
        assert!(!log.contains("peer_id="));
    }
}
