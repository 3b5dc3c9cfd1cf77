//! Run command - Review the change described by the CI event

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use reviewbot_core::event::load_event;
use reviewbot_core::{
    ChatSink, Config, DiffSource, DiscordWebhook, GeminiModel, Notifier, Pipeline, ResourceRules,
    ReviewRequester, RunOutcome, Secrets, WebhookPayload,
};
use reviewbot_github::GitHubClient;
use tracing::{error, info, warn};

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the event payload written by the CI system
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Name of the triggering event (push, pull_request)
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Print webhook payloads instead of posting them
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Arguments for a bare invocation, taken from the CI environment
    pub fn from_env() -> Self {
        Self {
            event_path: std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from),
            event_name: std::env::var("GITHUB_EVENT_NAME").ok(),
            dry_run: false,
        }
    }

    /// Execute the run command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let Some(event_path) = &self.event_path else {
            error!("GITHUB_EVENT_PATH not found.");
            anyhow::bail!("GITHUB_EVENT_PATH not found");
        };
        let event_name = self.event_name.as_deref().unwrap_or_default();

        let interpreted = load_event(event_path, event_name)
            .with_context(|| format!("Failed to read event payload {}", event_path.display()))?;

        let secrets = Secrets::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring secrets file, using environment only");
            Secrets::default()
        });

        let github = build_github(&secrets, config);
        let reviewer = build_reviewer(&secrets, config);
        let notifier = if self.dry_run {
            info!("Dry run: payloads will be printed, not posted");
            Notifier::new(Box::new(PrintSink))
        } else {
            build_notifier(&secrets, config)
        };
        let rules = ResourceRules::from_config(&config.resources);

        let pipeline = Pipeline {
            diffs: github.as_ref().map(|client| client as &dyn DiffSource),
            reviewer: &reviewer,
            notifier: &notifier,
            rules: &rules,
            config,
        };

        match pipeline.run(interpreted).await {
            RunOutcome::Completed(report) => {
                info!(sent = report.sent, failed = report.failed, "Run finished")
            }
            outcome => info!(?outcome, "Run finished without a review"),
        }

        Ok(())
    }
}

fn build_github(secrets: &Secrets, config: &Config) -> Option<GitHubClient> {
    let token = secrets.github_token()?;
    match GitHubClient::new(token, &config.github) {
        Ok(client) => Some(client),
        Err(e) => {
            error!(error = %e, "Failed to create GitHub client");
            None
        }
    }
}

fn build_reviewer(secrets: &Secrets, config: &Config) -> ReviewRequester {
    let Some(api_key) = secrets.gemini_api_key() else {
        error!("GEMINI_API_KEY is not set.");
        return ReviewRequester::unconfigured();
    };

    match GeminiModel::new(&config.review, api_key) {
        Ok(model) => {
            info!(model = %config.review.model, "Gemini model initialized");
            ReviewRequester::new(Box::new(model))
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Gemini model");
            ReviewRequester::unconfigured()
        }
    }
}

fn build_notifier(secrets: &Secrets, config: &Config) -> Notifier {
    let Some(url) = secrets.discord_webhook_url() else {
        return Notifier::unconfigured();
    };

    match DiscordWebhook::new(&url, &config.notify) {
        Ok(webhook) => Notifier::new(Box::new(webhook)),
        Err(e) => {
            error!(error = %e, "Failed to create Discord webhook");
            Notifier::unconfigured()
        }
    }
}

/// Sink that writes payloads to stdout as JSON
struct PrintSink;

#[async_trait]
impl ChatSink for PrintSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn post(&self, payload: &WebhookPayload) -> reviewbot_core::Result<u16> {
        println!("{}", serde_json::to_string_pretty(payload)?);
        Ok(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_event_path_fails() {
        let args = RunArgs::default();
        let err = args.execute(&Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("GITHUB_EVENT_PATH"));
    }

    #[tokio::test]
    async fn test_unreadable_event_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            event_path: Some(dir.path().join("missing.json")),
            event_name: Some("push".to_string()),
            dry_run: true,
        };
        assert!(args.execute(&Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_skipped_event_succeeds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"repository": {{"full_name": "octo/game"}}}}"#).unwrap();

        let args = RunArgs {
            event_path: Some(file.path().to_path_buf()),
            event_name: Some("issues".to_string()),
            dry_run: true,
        };
        args.execute(&Config::default()).await.unwrap();
    }
}
