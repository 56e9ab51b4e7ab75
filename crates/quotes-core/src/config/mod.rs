//! Remote sync configuration shared by all clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Mock REST endpoint used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "https://jsonplaceholder.typicode.com/posts";
/// Seconds between periodic syncs
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15;
/// Number of remote items considered per fetch
pub const DEFAULT_FETCH_LIMIT: usize = 5;
/// Category assigned to quotes mapped from remote posts
pub const DEFAULT_SERVER_CATEGORY: &str = "Server";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration for remote sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Collection endpoint, e.g. `https://jsonplaceholder.typicode.com/posts`
    pub server_url: String,
    /// Automatic sync interval; `None` means manual sync only
    pub sync_interval: Option<Duration>,
    /// Maximum number of remote items merged per sync
    pub fetch_limit: usize,
    /// Category given to remote items
    pub server_category: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            sync_interval: Some(Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS)),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            server_category: DEFAULT_SERVER_CATEGORY.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    /// Create a configuration for the given endpoint with default settings
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            server_url: normalize_server_url(server_url.into())?,
            ..Self::default()
        })
    }

    /// Set the automatic sync interval
    #[must_use]
    pub const fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Disable automatic sync (manual sync only)
    #[must_use]
    pub const fn without_auto_sync(mut self) -> Self {
        self.sync_interval = None;
        self
    }

    /// Set how many remote items each fetch keeps
    #[must_use]
    pub const fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit;
        self
    }
}

/// Validate an endpoint URL and strip trailing slashes.
pub fn normalize_server_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("server URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "server URL must include http:// or https://".to_string(),
        ))
    }
}
