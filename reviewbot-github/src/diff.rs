//! Unified diff retrieval

use async_trait::async_trait;
use reviewbot_core::{DiffLocator, DiffSource};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Media type that makes the REST API answer with a unified diff
pub const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

impl GitHubClient {
    /// Fetch the unified diff for `locator` in `owner/repo`
    pub async fn get_diff(&self, full_name: &str, locator: &DiffLocator) -> Result<String> {
        let url = locator
            .resolve(self.api_url(), full_name)
            .map_err(|e| Error::Parse(e.to_string()))?;
        debug!(url = %url, "Fetching diff");

        let response = self
            .http()
            .get(url.clone())
            .header("Authorization", format!("token {}", self.token()))
            .header("Accept", DIFF_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("diff fetch")
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let diff = response.text().await?;
        info!(bytes = diff.len(), "Fetched diff");
        Ok(diff)
    }
}

#[async_trait]
impl DiffSource for GitHubClient {
    async fn verify_access(&self, repository: &str) -> reviewbot_core::Result<()> {
        Ok(self.test_connection(repository).await?)
    }

    async fn fetch_diff(
        &self,
        repository: &str,
        locator: &DiffLocator,
    ) -> reviewbot_core::Result<String> {
        Ok(self.get_diff(repository, locator).await?)
    }
}
