//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Raw HTTP transport error
    #[error("GitHub HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Repository missing or hidden from this token
    #[error("Repository {0} not found or not accessible")]
    RepoNotFound(String),

    /// Non-success response to a raw request
    #[error("GitHub returned HTTP {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    /// Call exceeded its timeout
    #[error("GitHub {0} timed out")]
    Timeout(&'static str),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for reviewbot_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout(what) => reviewbot_core::Error::Timeout(what),
            Error::Status { status, body, .. } => reviewbot_core::Error::Service {
                service: "GitHub",
                status,
                body,
            },
            other => reviewbot_core::Error::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_service_error() {
        let err: reviewbot_core::Error = Error::Status {
            status: 404,
            url: "https://api.github.com/repos/o/r/compare/a...b".to_string(),
            body: "Not Found".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            reviewbot_core::Error::Service { service: "GitHub", status: 404, .. }
        ));
    }

    #[test]
    fn test_timeout_maps_to_timeout() {
        let err: reviewbot_core::Error = Error::Timeout("diff fetch").into();
        assert!(matches!(err, reviewbot_core::Error::Timeout("diff fetch")));
    }
}
