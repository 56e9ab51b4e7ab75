//! Remote quote source and its HTTP adapter.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::models::Quote;
use crate::util::compact_text;

use super::merge::RemoteQuote;

/// A collaborator that serves quote candidates and accepts new quotes
#[async_trait]
pub trait RemoteQuoteSource: Send + Sync {
    /// Fetch the current remote candidate list
    async fn fetch_quotes(&self) -> Result<Vec<RemoteQuote>>;

    /// Send a new local quote outward; returns the remote id when one is assigned
    async fn submit_quote(&self, quote: &Quote) -> Result<Option<i64>>;
}

/// Source used when sync is disabled: nothing to fetch, nothing accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineQuoteSource;

#[async_trait]
impl RemoteQuoteSource for OfflineQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<RemoteQuote>> {
        Ok(Vec::new())
    }

    async fn submit_quote(&self, _quote: &Quote) -> Result<Option<i64>> {
        Ok(None)
    }
}

/// JSONPlaceholder-style `/posts` endpoint treated as a quote server
#[derive(Clone)]
pub struct HttpQuoteSource {
    endpoint: String,
    fetch_limit: usize,
    server_category: String,
    client: reqwest::Client,
}

impl HttpQuoteSource {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            endpoint: config.server_url.clone(),
            fetch_limit: config.fetch_limit,
            server_category: config.server_category.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteQuoteSource for HttpQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<RemoteQuote>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }

        let posts = response.json::<Vec<RemotePost>>().await?;
        let quotes = posts_to_quotes(posts, self.fetch_limit, &self.server_category);
        tracing::debug!("Fetched {} remote quote candidates", quotes.len());
        Ok(quotes)
    }

    async fn submit_quote(&self, quote: &Quote) -> Result<Option<i64>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&NewPost::from(quote))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }

        let created = response.json::<CreatedPost>().await?;
        Ok(created.id)
    }
}

/// Post shape served by the mock endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePost {
    id: Option<i64>,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPost<'a> {
    title: &'a str,
    body: &'a str,
    user_id: i64,
}

impl<'a> From<&'a Quote> for NewPost<'a> {
    fn from(quote: &'a Quote) -> Self {
        Self {
            title: &quote.text,
            body: &quote.category,
            user_id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: Option<i64>,
}

fn posts_to_quotes(posts: Vec<RemotePost>, limit: usize, category: &str) -> Vec<RemoteQuote> {
    posts
        .into_iter()
        .take(limit)
        .map(|post| RemoteQuote::new(post.id, post.title, category))
        .collect()
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
