//! HTTP transport seam.
//!
//! The engine only needs three verbs against JSON endpoints, so the trait
//! stays that small. [`crate::api::ApiClient`] builds on it.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

/// Request headers.
pub type Headers = HashMap<String, String>;

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self { status, body }
    }

    /// A 200 response carrying `value` as its body.
    pub fn json_ok(value: &serde_json::Value) -> Self {
        Self::new(200, Bytes::from(value.to_string()))
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failure to get any response at all.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// The server could not be reached
    ConnectionFailed(String),
    /// No response within the client timeout
    Timeout(String),
    /// Transport-level status error (mocks use this to fake one)
    ServerError { status: u16, message: String },
    /// The request could not be built
    InvalidUrl(String),
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Transport used by the API client.
///
/// Any response the server produced is `Ok`, including non-2xx statuses.
/// Interpreting the status is up to the caller.
///
/// ```ignore
/// use alumni_sync::traits::{HttpClient, Headers, HttpError};
///
/// async fn feed_body<C: HttpClient>(client: &C) -> Result<String, HttpError> {
///     let response = client.get("https://example.com/api/notifications", &Headers::new()).await?;
///     response.text().map_err(|e| HttpError::Other(e.to_string()))
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// POST a string body.
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;
}
