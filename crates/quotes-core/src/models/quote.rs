//! Quote model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::util::unix_timestamp_ms_now;

/// A unique identifier for a quote, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(Uuid);

impl QuoteId {
    /// Create a new unique quote ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for QuoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a quote record was first created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrigin {
    /// Added on this device (by hand or by import)
    #[default]
    Local,
    /// Appended by a sync from the remote source
    Remote,
}

/// A quote in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unique identifier
    #[serde(default)]
    pub id: QuoteId,
    /// Quote text, also the de-duplication key on import
    pub text: String,
    /// Free-form category label
    pub category: String,
    /// Last update timestamp (Unix ms)
    #[serde(default = "unix_timestamp_ms_now")]
    pub updated_at: i64,
    /// Identifier of the matching remote record, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<i64>,
    /// Where the record came from
    #[serde(default)]
    pub origin: QuoteOrigin,
    /// Content was last overwritten by the remote source during a merge
    #[serde(default)]
    pub resolved_remote: bool,
}

impl Quote {
    /// Create a new local quote with the given text and category
    #[must_use]
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: QuoteId::new(),
            text: text.into(),
            category: category.into(),
            updated_at: unix_timestamp_ms_now(),
            server_id: None,
            origin: QuoteOrigin::Local,
            resolved_remote: false,
        }
    }

    /// Create a quote that arrived from the remote source
    #[must_use]
    pub fn from_remote(
        server_id: Option<i64>,
        text: impl Into<String>,
        category: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: QuoteId::new(),
            text: text.into(),
            category: category.into(),
            updated_at: now_ms,
            server_id,
            origin: QuoteOrigin::Remote,
            resolved_remote: false,
        }
    }

    /// Whether this record matches a category label exactly (case-sensitive)
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }

    /// Display form used by the CLI: `"text" — category`
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("\"{}\" — {}", self.text, self.category)
    }
}

/// The collection used when nothing has been persisted yet
#[must_use]
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "The best way to get started is to quit talking and begin doing.",
            "Motivation",
        ),
        Quote::new(
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        Quote::new(
            "Do not let what you cannot do interfere with what you can do.",
            "Inspiration",
        ),
    ]
}
