//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to a data source.
///
/// Every variant describes a single failed call. Callers in the pipeline
/// recover from these per season, per driver or per subsession.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Requested URL, without query credentials
        url: String,
    },

    /// Login rejected or session expired
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit error
    #[error("Rate limit exceeded, please retry after {retry_after_ms}ms")]
    RateLimit {
        /// Milliseconds to wait before retrying
        retry_after_ms: u64,
    },

    /// Response body did not have the expected shape
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested record does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query parameters rejected before sending
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The source has no data to offer for this call
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
