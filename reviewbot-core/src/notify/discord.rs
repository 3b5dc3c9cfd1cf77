//! Discord webhook sink

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::NotifyConfig;
use crate::{Error, Result};

use super::{ChatSink, WebhookPayload};

const SERVICE: &str = "Discord";

/// Posts payloads to one Discord webhook URL
#[derive(Clone)]
pub struct DiscordWebhook {
    client: Client,
    url: Url,
}

impl DiscordWebhook {
    pub fn new(webhook_url: &str, config: &NotifyConfig) -> Result<Self> {
        let url = Url::parse(webhook_url)
            .map_err(|e| Error::Config(format!("Invalid webhook URL: {e}")))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create {SERVICE} client: {e}")))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl ChatSink for DiscordWebhook {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn post(&self, payload: &WebhookPayload) -> Result<u16> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("Discord webhook post")
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
            return Err(Error::Service {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Webhook accepted message");
        Ok(status.as_u16())
    }
}

impl std::fmt::Debug for DiscordWebhook {
    // the webhook URL embeds its token
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordWebhook")
            .field("host", &self.url.host_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let err = DiscordWebhook::new("not-a-url", &NotifyConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let hook = DiscordWebhook::new(
            "https://discord.com/api/webhooks/123/secret-token",
            &NotifyConfig::default(),
        )
        .unwrap();
        let debug = format!("{hook:?}");
        assert!(debug.contains("discord.com"));
        assert!(!debug.contains("secret-token"));
    }
}
