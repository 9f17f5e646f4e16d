//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! The [`CinesyncError::is_transient`] split drives retry behavior: transient
//! I/O failures are retried with backoff, configuration mistakes are not.

use thiserror::Error;

/// Main cinesync error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum CinesyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A related table was requested that has no registered binding.
    ///
    /// This signals a static misconfiguration and is never retried.
    #[error("no relation binding for table '{table}' on base table '{base}'")]
    UnknownRelation { table: String, base: String },

    /// PostgreSQL catalog errors
    #[error("Database error: {0}")]
    Database(String),

    /// Elasticsearch errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Watermark store errors
    #[error("State error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Elasticsearch-specific errors
///
/// These errors don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Failed to reach the search cluster
    #[error("failed to connect to Elasticsearch: {0}")]
    ConnectionFailed(String),

    /// Non-success response from the cluster
    #[error("server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    /// A `_bulk` request was accepted but some items were rejected
    #[error("bulk load rejected {failed}/{total} documents")]
    BulkRejected { failed: usize, total: usize },

    /// Failed to create an index
    #[error("failed to create index '{index}': {message}")]
    IndexCreationFailed { index: String, message: String },
}

impl CinesyncError {
    /// Whether the error is worth retrying.
    ///
    /// Connection drops and server-side failures are transient; anything
    /// rooted in configuration or data shape will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            CinesyncError::Database(_) | CinesyncError::State(_) | CinesyncError::Io(_) => true,
            CinesyncError::Search(e) => e.is_transient(),
            CinesyncError::Configuration(_)
            | CinesyncError::UnknownRelation { .. }
            | CinesyncError::Serialization(_)
            | CinesyncError::Other(_) => false,
        }
    }
}

impl SearchError {
    fn is_transient(&self) -> bool {
        match self {
            SearchError::ConnectionFailed(_) => true,
            SearchError::ServerError { status, .. } => *status == 429 || *status >= 500,
            // Idempotent upserts make a partial bulk rejection safe to re-send.
            SearchError::BulkRejected { .. } => true,
            SearchError::InvalidResponse(_) | SearchError::IndexCreationFailed { .. } => false,
        }
    }
}

impl From<std::io::Error> for CinesyncError {
    fn from(err: std::io::Error) -> Self {
        CinesyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CinesyncError {
    fn from(err: serde_json::Error) -> Self {
        CinesyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CinesyncError {
    fn from(err: toml::de::Error) -> Self {
        CinesyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for CinesyncError {
    fn from(err: tokio_postgres::Error) -> Self {
        CinesyncError::Database(err.to_string())
    }
}
