//! Engine configuration.
//!
//! Built with the `with_*` builder methods or read from the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `ALUMNI_API_URL` | chat server | `http://localhost:5000` |
//! | `ALUMNI_FEED_URL` | notification and yearbook server | `http://localhost:5001` |
//! | `ALUMNI_MEDIA_URL` | prefix for bare image filenames | feed URL |
//! | `ALUMNI_DATA_DIR` | key/value store directory | `<data dir>/alumni-sync` |
//! | `ALUMNI_USER_ID` | the signed-in user | none |
//! | `ALUMNI_HTTP_TIMEOUT_SECS` | request timeout | 30 |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{StorageError, SyncError, SyncResult};
use crate::models::MediaResolver;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_FEED_URL: &str = "http://localhost:5001";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Directory name under the platform data directory.
const APP_DIR: &str = "alumni-sync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the chat server.
    pub api_url: String,
    /// Base URL of the notification and yearbook server.
    pub feed_url: String,
    /// Prefix for bare image filenames. Falls back to `feed_url`.
    pub media_url: Option<String>,
    /// Where the key/value store lives. Falls back to the platform data dir.
    pub data_dir: Option<PathBuf>,
    pub user_id: Option<String>,
    pub http_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            media_url: None,
            data_dir: None,
            user_id: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_base(url.into());
        self
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = trim_base(url.into());
        self
    }

    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(trim_base(url.into()));
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Read the `ALUMNI_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_var("ALUMNI_API_URL") {
            config = config.with_api_url(url);
        }
        if let Some(url) = env_var("ALUMNI_FEED_URL") {
            config = config.with_feed_url(url);
        }
        if let Some(url) = env_var("ALUMNI_MEDIA_URL") {
            config = config.with_media_url(url);
        }
        if let Some(dir) = env_var("ALUMNI_DATA_DIR") {
            config = config.with_data_dir(dir);
        }
        if let Some(user_id) = env_var("ALUMNI_USER_ID") {
            config = config.with_user_id(user_id);
        }
        if let Some(raw) = env_var("ALUMNI_HTTP_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config = config.with_http_timeout(Duration::from_secs(secs));
                }
                _ => tracing::warn!(
                    "Ignoring invalid ALUMNI_HTTP_TIMEOUT_SECS={:?}, using {}s",
                    raw,
                    DEFAULT_HTTP_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    /// Prefix applied to bare image filenames.
    pub fn media_base(&self) -> &str {
        self.media_url.as_deref().unwrap_or(&self.feed_url)
    }

    pub fn media_resolver(&self) -> MediaResolver {
        MediaResolver::new(self.media_base())
    }

    /// The configured data directory, or `<platform data dir>/alumni-sync`.
    pub fn resolve_data_dir(&self) -> SyncResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| SyncError::from(StorageError::NoDataDirectory)),
        }
    }

    /// The signed-in user, required for anything chat related.
    pub fn require_user_id(&self) -> SyncResult<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SyncError::Config {
                message: "no user id configured (set ALUMNI_USER_ID or pass --user)".to_string(),
            })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
