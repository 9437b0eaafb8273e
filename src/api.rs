//! Client for the feed and chat servers.
//!
//! Two base URLs are involved: the feed server (notifications, posts,
//! events, yearbooks) and the chat server (messages). Read failures surface
//! as [`SyncError::Fetch`], failed writes as [`SyncError::WriteAck`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::SyncConfig;
use crate::error::{ErrorContext, NetworkError, ResultExt, SyncError, SyncResult};
use crate::models::{
    created_message_id, parse_history, parse_notification_list, parse_yearbook_images, Message,
    Notification, NotificationKind, OutgoingMessage, RelatedContent,
};
use crate::traits::{Headers, HttpClient, Response};

/// HTTP client for the engine's endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    /// Base URL of the chat server
    pub api_url: String,
    /// Base URL of the feed server
    pub feed_url: String,
}

impl ApiClient {
    pub fn new(http: Arc<dyn HttpClient>, config: &SyncConfig) -> Self {
        Self::with_base_urls(http, config.api_url.clone(), config.feed_url.clone())
    }

    pub fn with_base_urls(
        http: Arc<dyn HttpClient>,
        api_url: impl Into<String>,
        feed_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            feed_url: feed_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn json_headers() -> Headers {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers
    }

    /// Turn a non-2xx response into an error.
    fn check_status(response: Response) -> Result<Response, NetworkError> {
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(NetworkError::HttpStatus {
            status: response.status,
            message,
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, NetworkError> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url, &Self::json_headers())
            .await
            .map_err(|e| with_url(NetworkError::from(e), url))?;
        let response = Self::check_status(response)?;
        Ok(response.json::<Value>()?)
    }

    /// Fetch the notification feed.
    pub async fn fetch_notifications(&self) -> SyncResult<Vec<Notification>> {
        let url = format!("{}/api/notifications", self.feed_url);
        let ctx = || ErrorContext::new("fetch_notifications").with_component("api");

        let value = self
            .get_json(&url)
            .await
            .map_err(SyncError::Fetch)
            .with_context(ctx)?;
        parse_notification_list(value)
            .map_err(|e| SyncError::Fetch(e.into()))
            .with_context(ctx)
    }

    /// Fetch the conversation between `self_id` and `peer_id`.
    pub async fn fetch_history(&self, self_id: &str, peer_id: &str) -> SyncResult<Vec<Message>> {
        let url = format!("{}/api/messages/{}/{}", self.api_url, self_id, peer_id);
        let ctx = || {
            ErrorContext::new("fetch_history")
                .with_peer_id(peer_id)
                .with_component("api")
        };

        let value = self
            .get_json(&url)
            .await
            .map_err(SyncError::Fetch)
            .with_context(ctx)?;
        parse_history(value, self_id)
            .map_err(|e| SyncError::Fetch(e.into()))
            .with_context(ctx)
    }

    /// Create a message. Returns the server-assigned id when the response
    /// carries one.
    pub async fn send_message(&self, body: &OutgoingMessage) -> SyncResult<Option<String>> {
        let url = format!("{}/api/messages", self.api_url);
        let ctx = || {
            ErrorContext::new("send_message")
                .with_peer_id(&body.receiver_id)
                .with_component("api")
        };

        let payload = serde_json::to_string(body)
            .map_err(|e| SyncError::WriteAck(e.into()))
            .with_context(ctx)?;

        let mut headers = Self::json_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(&url, &payload, &headers)
            .await
            .map_err(|e| with_url(NetworkError::from(e), &url))
            .and_then(Self::check_status)
            .map_err(SyncError::WriteAck)
            .with_context(ctx)?;

        let id = match response.json::<Value>() {
            Ok(value) => {
                reject_if_unsuccessful(&value)
                    .map_err(SyncError::WriteAck)
                    .with_context(ctx)?;
                created_message_id(&value)
            }
            // A success status with a non-JSON body carries no id.
            Err(_) => None,
        };

        Ok(id)
    }

    /// Delete a message on the server.
    ///
    /// Succeeds on a 2xx response whose body does not say `"success": false`.
    pub async fn delete_message(&self, message_id: &str) -> SyncResult<()> {
        let url = format!("{}/api/messages/{}", self.api_url, message_id);
        let ctx = || ErrorContext::new("delete_message").with_component("api");

        tracing::debug!("DELETE {}", url);
        let response = self
            .http
            .delete(&url, &Self::json_headers())
            .await
            .map_err(|e| with_url(NetworkError::from(e), &url))
            .and_then(Self::check_status)
            .map_err(SyncError::WriteAck)
            .with_context(ctx)?;

        if let Ok(value) = response.json::<Value>() {
            reject_if_unsuccessful(&value)
                .map_err(SyncError::WriteAck)
                .with_context(ctx)?;
        }
        Ok(())
    }

    /// Look up the post or event a notification refers to.
    ///
    /// Kinds without related content resolve to `None` without a request.
    pub async fn fetch_related(
        &self,
        kind: NotificationKind,
        related_id: &str,
    ) -> SyncResult<Option<RelatedContent>> {
        if !kind.has_related_content() || related_id.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/api/{}s/{}", self.feed_url, kind.as_str(), related_id);
        let value = self
            .get_json(&url)
            .await
            .map_err(SyncError::Fetch)
            .with_context(|| ErrorContext::new("fetch_related").with_component("api"))?;

        Ok(Some(RelatedContent::new(kind, related_id, value)))
    }

    /// Page references of a yearbook, blank entries dropped.
    pub async fn fetch_yearbook_images(&self, yearbook_id: &str) -> SyncResult<Vec<String>> {
        let url = format!("{}/yearbook/{}/images", self.feed_url, yearbook_id);
        let ctx = || ErrorContext::new("fetch_yearbook_images").with_component("api");

        let value = self
            .get_json(&url)
            .await
            .map_err(SyncError::Fetch)
            .with_context(ctx)?;
        parse_yearbook_images(value)
            .map_err(|e| SyncError::Fetch(e.into()))
            .with_context(ctx)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url)
            .field("feed_url", &self.feed_url)
            .finish_non_exhaustive()
    }
}

fn with_url(err: NetworkError, url: &str) -> NetworkError {
    match err {
        NetworkError::ConnectionFailed { message, .. } => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        other => other,
    }
}

/// A 2xx body of `{"success": false, ...}` is a rejection.
fn reject_if_unsuccessful(body: &Value) -> Result<(), NetworkError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("server reported failure")
            .to_string();
        return Err(NetworkError::Rejected { message });
    }
    Ok(())
}
