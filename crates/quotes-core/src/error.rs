//! Error types for quotes-core

use thiserror::Error;

/// Result type alias using quotes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quotes-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required quote field was empty after trimming
    #[error("Missing field: {0} must not be empty")]
    MissingField(&'static str),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote quote source rejected or failed the request
    #[error("Remote error: {0}")]
    Remote(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Another sync is still waiting on its fetch
    #[error("A sync is already in progress")]
    SyncInProgress,

    /// Quote not found
    #[error("Quote not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether the failure is expected to clear up on the next attempt.
    ///
    /// Transient failures leave local state untouched; the scheduler retries
    /// them on its next tick.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Http(_) | Self::SyncInProgress)
    }
}
