//! Unified error type for the synchronization engine.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::storage::StorageError;

/// Unified error type for the synchronization engine.
///
/// Reads and writes are kept apart at the variant level because the engine
/// reacts to them differently: a failed read keeps the previous state, a
/// failed write keeps the optimistic mutation.
#[derive(Debug)]
pub enum SyncError {
    /// A read from the server failed (feed, history, related content, yearbook).
    Fetch(NetworkError),

    /// A write to the server was not acknowledged (send, delete).
    WriteAck(NetworkError),

    /// Local key/value storage failure.
    Storage(StorageError),

    /// Configuration is missing or invalid.
    Config { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<SyncError>,
        context: ErrorContext,
    },
}

impl SyncError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Fetch(_) => ErrorCategory::TransientFetch,
            SyncError::WriteAck(_) => ErrorCategory::WriteAck,
            SyncError::Storage(_) => ErrorCategory::Storage,
            SyncError::Config { .. } => ErrorCategory::Configuration,
            SyncError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Fetch(err) | SyncError::WriteAck(err) => err.is_retryable(),
            SyncError::Storage(_) | SyncError::Config { .. } => false,
            SyncError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Fetch(err) => err.user_message(),
            SyncError::WriteAck(err) => format!(
                "{} {}",
                err.user_message(),
                ErrorCategory::WriteAck.recovery_hint()
            ),
            SyncError::Storage(err) => format!("Local storage error: {}", err),
            SyncError::Config { message } => format!("Configuration error: {}", message),
            SyncError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Fetch(err) | SyncError::WriteAck(err) => err.error_code(),
            SyncError::Storage(err) => err.error_code(),
            SyncError::Config { .. } => "E_CONFIG",
            SyncError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SyncError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SyncError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &SyncError {
        match self {
            SyncError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Fetch(err) => write!(f, "fetch failed: {}", err),
            SyncError::WriteAck(err) => write!(f, "write not acknowledged: {}", err),
            SyncError::Storage(err) => write!(f, "{}", err),
            SyncError::Config { message } => write!(f, "invalid configuration: {}", message),
            SyncError::WithContext { error, context } => write!(f, "{} {}", context, error),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Fetch(err) | SyncError::WriteAck(err) => Some(err),
            SyncError::Storage(err) => Some(err),
            SyncError::Config { .. } => None,
            SyncError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        SyncError::Storage(err)
    }
}
