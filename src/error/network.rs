//! Network-related error types.
//!
//! Errors produced while talking to the feed and chat servers.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { operation: String },

    /// HTTP status error (non-2xx response).
    HttpStatus { status: u16, message: String },

    /// The server answered 2xx but reported failure in the body.
    Rejected { message: String },

    /// Response body could not be decoded.
    InvalidResponse { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::Rejected { .. } => false,
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your internet connection."
                    .to_string()
            }
            NetworkError::Timeout { operation } => {
                format!("The {} request timed out.", operation)
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                401 => "Your session has expired. Please sign in again.".to_string(),
                404 => "The requested item was not found.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::Rejected { message } => {
                format!("The server refused the request: {}", message)
            }
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server.".to_string()
            }
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::Rejected { .. } => "E_NET_REJECTED",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation } => write!(f, "{} timed out", operation),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::Rejected { message } => write!(f, "Request rejected: {}", message),
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: String::new(),
                message,
            },
            HttpError::Timeout(operation) => NetworkError::Timeout { operation },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::InvalidUrl(message) | HttpError::Other(message) => {
                NetworkError::Other { message }
            }
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::InvalidResponse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let retry = |status| NetworkError::HttpStatus {
            status,
            message: String::new(),
        };
        assert!(retry(500).is_retryable());
        assert!(retry(503).is_retryable());
        assert!(retry(429).is_retryable());
        assert!(!retry(404).is_retryable());
        assert!(!retry(400).is_retryable());
    }

    #[test]
    fn test_from_http_error() {
        let err: NetworkError = HttpError::ServerError {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 502,
                message: "bad gateway".to_string()
            }
        );

        let err: NetworkError = HttpError::Timeout("GET /api/notifications".to_string()).into();
        assert!(matches!(err, NetworkError::Timeout { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_json_error_is_invalid_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: NetworkError = json_err.into();
        assert_eq!(err.error_code(), "E_NET_INVALID");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages_not_empty() {
        let errors = vec![
            NetworkError::ConnectionFailed {
                url: "http://x".to_string(),
                message: "refused".to_string(),
            },
            NetworkError::Timeout {
                operation: "history".to_string(),
            },
            NetworkError::Rejected {
                message: "nope".to_string(),
            },
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
