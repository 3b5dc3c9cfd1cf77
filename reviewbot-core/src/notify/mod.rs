//! Chat notifications
//!
//! Review pages are wrapped into webhook payloads and delivered one at a time.
//! Delivery problems are logged and never abort the run.

mod discord;
mod payload;

pub use discord::DiscordWebhook;
pub use payload::{Embed, Footer, MessageTemplate, WebhookPayload, MAX_TITLE_CHARS};

use async_trait::async_trait;
use tracing::{error, info};

use crate::Result;

/// Destination for webhook payloads
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Deliver one payload, returning the success status code
    async fn post(&self, payload: &WebhookPayload) -> Result<u16>;
}

/// Outcome of delivering a batch of payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends payloads to an optional sink, logging every outcome
pub struct Notifier {
    sink: Option<Box<dyn ChatSink>>,
}

impl Notifier {
    pub fn new(sink: Box<dyn ChatSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Notifier with no destination; every message is dropped with an error log
    pub fn unconfigured() -> Self {
        Self { sink: None }
    }

    /// Send one payload. Returns whether it was delivered.
    pub async fn notify(&self, payload: &WebhookPayload) -> bool {
        let Some(sink) = &self.sink else {
            error!("DISCORD_WEBHOOK_URL is not set. Cannot send message.");
            return false;
        };

        match sink.post(payload).await {
            Ok(status) => {
                info!(sink = sink.name(), status, "Successfully sent message");
                true
            }
            Err(e) => {
                error!(sink = sink.name(), error = %e, "Error sending message");
                false
            }
        }
    }

    /// Send payloads in order; a failed one does not stop the rest
    pub async fn notify_all(&self, payloads: &[WebhookPayload]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for payload in payloads {
            if self.notify(payload).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sink", &self.sink.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::{Arc, Mutex};

    /// Fails every post whose description matches `fail_on`
    struct RecordingSink {
        fail_on: Option<&'static str>,
        posted: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn post(&self, payload: &WebhookPayload) -> Result<u16> {
            let body = payload.embeds[0].description.clone();
            self.posted.lock().unwrap().push(body.clone());
            if Some(body.as_str()) == self.fail_on {
                return Err(Error::Service {
                    service: "recording",
                    status: 400,
                    body: "bad embed".to_string(),
                });
            }
            Ok(204)
        }
    }

    fn payload(body: &str) -> WebhookPayload {
        WebhookPayload {
            username: "bot".to_string(),
            embeds: vec![Embed {
                title: "t".to_string(),
                url: "https://example.com".to_string(),
                color: 0,
                footer: Footer {
                    text: "f".to_string(),
                },
                description: body.to_string(),
                timestamp: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_failed_post_does_not_stop_others() {
        let posted = Arc::new(Mutex::new(Vec::new()));
        let notifier = Notifier::new(Box::new(RecordingSink {
            fail_on: Some("two"),
            posted: Arc::clone(&posted),
        }));

        let report = notifier
            .notify_all(&[payload("one"), payload("two"), payload("three")])
            .await;

        assert_eq!(report, DeliveryReport { sent: 2, failed: 1 });
        assert_eq!(*posted.lock().unwrap(), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_unconfigured_drops_messages() {
        let notifier = Notifier::unconfigured();
        assert!(!notifier.notify(&payload("x")).await);

        let report = notifier.notify_all(&[payload("a"), payload("b")]).await;
        assert_eq!(report, DeliveryReport { sent: 0, failed: 2 });
    }
}
