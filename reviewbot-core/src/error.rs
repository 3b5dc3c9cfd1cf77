//! Error types for reviewbot

use thiserror::Error;

/// Result type alias for reviewbot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reviewbot operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Service {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// An external call did not finish within its timeout
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
