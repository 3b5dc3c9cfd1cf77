//! GitHub API client using octocrab

use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};
use octocrab::Octocrab;
use reviewbot_core::config::GitHubConfig;
use tracing::{debug, info};

/// GitHub API client authenticated with a single static token
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    token: String,
    api_url: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Create a client for the configured API host
    pub fn new(token: impl Into<String>, config: &GitHubConfig) -> Result<Self> {
        let token = token.into();

        let client = Octocrab::builder()
            .personal_token(token.clone())
            .base_uri(config.api_url.as_str())
            .map_err(|e| Error::Auth(format!("Invalid GitHub API URL {}: {}", config.api_url, e)))?
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reviewbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(api_url = %config.api_url, "Created GitHub client");

        Ok(Self {
            client,
            http,
            token,
            api_url: config.api_url.clone(),
            timeout: config.timeout,
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// REST API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Run an octocrab call under the configured timeout
    async fn with_timeout<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = octocrab::Result<T>>,
    ) -> Result<octocrab::Result<T>> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| Error::Timeout(what))
    }

    /// Check that the token can read `owner/repo`
    pub async fn test_connection(&self, full_name: &str) -> Result<()> {
        let (owner, repo) = split_full_name(full_name)?;
        debug!(owner, repo, "Testing GitHub API token access");

        self.with_timeout("repository lookup", self.client.repos(owner, repo).get())
            .await?
            .map_err(|e| match e {
                octocrab::Error::GitHub { source, .. } => {
                    if source.message.contains("Not Found") {
                        Error::RepoNotFound(full_name.to_string())
                    } else if source.message.contains("Bad credentials") {
                        Error::Auth("Invalid GitHub token".to_string())
                    } else {
                        Error::Auth(source.message)
                    }
                }
                other => Error::Api(other),
            })?;

        info!(repo = full_name, "API token has valid access to the repository");
        Ok(())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Split a repository full name (`owner/repo`)
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(Error::Parse(format!(
            "Invalid repository name: {}. Expected owner/repo",
            full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        let (owner, repo) = split_full_name("octo/game").unwrap();
        assert_eq!(owner, "octo");
        assert_eq!(repo, "game");
    }

    #[test]
    fn test_split_invalid() {
        assert!(split_full_name("invalid").is_err());
        assert!(split_full_name("/repo").is_err());
        assert!(split_full_name("owner/").is_err());
        assert!(split_full_name("a/b/c").is_err());
    }

    #[tokio::test]
    async fn test_debug_hides_token() {
        let client = GitHubClient::new("ghp_secret", &GitHubConfig::default()).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("api.github.com"));
        assert!(!debug.contains("ghp_secret"));
    }

    #[tokio::test]
    async fn test_invalid_repo_name_fails_before_network() {
        let client = GitHubClient::new("ghp_secret", &GitHubConfig::default()).unwrap();
        let err = client.test_connection("not-a-repo").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
