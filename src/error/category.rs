//! Error category classification for unified error handling.
//!
//! Categories let callers decide how to surface a failure without matching on
//! every concrete error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A read (feed refresh, history load, related content) failed.
    /// Prior state is kept; nothing retries automatically.
    TransientFetch,

    /// A write (send, delete) was not acknowledged by the server.
    /// The optimistic local mutation stays in place.
    WriteAck,

    /// The local key/value store could not be read or written.
    Storage,

    /// Invalid or missing configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if the user can reasonably try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::TransientFetch | ErrorCategory::WriteAck)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::TransientFetch => "transient_fetch",
            ErrorCategory::WriteAck => "write_ack",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::TransientFetch => "Could not load the latest data",
            ErrorCategory::WriteAck => "The server did not confirm the change",
            ErrorCategory::Storage => "Local storage problem",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::TransientFetch => "Check your connection and refresh",
            ErrorCategory::WriteAck => {
                "Your change is shown locally but may not have reached the server"
            }
            ErrorCategory::Storage => "Check permissions on the data directory",
            ErrorCategory::Configuration => "Check your ALUMNI_* environment settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
