//! The review pipeline
//!
//! One pass per CI run: event -> diff fetch -> resource filter -> review ->
//! pagination -> notification. Every external call is awaited before the next
//! one starts, and no stage failure escapes as an error: the run just ends
//! early with the reason recorded in [`RunOutcome`].

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::classify::ResourceRules;
use crate::config::Config;
use crate::diff::filter_diff_with_stats;
use crate::event::{ChangeEvent, DiffLocator, EventKind, Interpreted, SkipReason};
use crate::notify::{DeliveryReport, MessageTemplate, Notifier, WebhookPayload};
use crate::paginate::{into_chunks, paginate};
use crate::review::ReviewRequester;
use crate::Result;

/// Source-control host that can serve unified diffs
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Check that the credentials can read `repository`
    async fn verify_access(&self, repository: &str) -> Result<()>;

    /// Fetch the unified diff for `locator` in `repository`
    async fn fetch_diff(&self, repository: &str, locator: &DiffLocator) -> Result<String>;
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The event does not call for a review
    Skipped(SkipReason),
    /// A stage could not run; nothing was posted
    Aborted(String),
    /// Only resource files changed
    NothingToReview,
    /// Review produced and delivery attempted for every page
    Completed(DeliveryReport),
}

/// Collaborators of a run, borrowed from the caller
pub struct Pipeline<'a> {
    /// `None` when no GitHub token is available
    pub diffs: Option<&'a dyn DiffSource>,
    pub reviewer: &'a ReviewRequester,
    pub notifier: &'a Notifier,
    pub rules: &'a ResourceRules,
    pub config: &'a Config,
}

impl Pipeline<'_> {
    /// Run the pipeline for an interpreted event
    pub async fn run(&self, interpreted: Interpreted) -> RunOutcome {
        match interpreted {
            Interpreted::Skip(reason) => {
                info!(%reason, "Nothing to review, exiting");
                RunOutcome::Skipped(reason)
            }
            Interpreted::Review(event) => self.review(&event).await,
        }
    }

    async fn review(&self, event: &ChangeEvent) -> RunOutcome {
        info!(
            kind = ?event.kind,
            repo = %event.repository,
            title = %event.title,
            "Processing change"
        );

        let Some(diffs) = self.diffs else {
            error!("GH_API_TOKEN is not set. Cannot fetch diff.");
            return RunOutcome::Aborted("missing GitHub token".to_string());
        };

        if let Err(e) = diffs.verify_access(&event.repository).await {
            error!(
                repo = %event.repository,
                error = %e,
                "API token cannot access the repository. Check that it has 'repo' scope \
                 and is authorized for SSO if this is an organization repository."
            );
            return RunOutcome::Aborted(format!("repository access check failed: {e}"));
        }

        info!(locator = %event.diff_locator, "Fetching diff");
        let raw = match diffs.fetch_diff(&event.repository, &event.diff_locator).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(locator = %event.diff_locator, error = %e, "Error fetching diff");
                return RunOutcome::Aborted(format!("diff fetch failed: {e}"));
            }
        };

        let diff = self.filter(event, raw);
        if diff.trim().is_empty() {
            info!("No code changes found to review. Exiting.");
            return RunOutcome::NothingToReview;
        }

        let review = self.reviewer.request_review(&diff).await;

        let payloads = self.payloads(event, &review);
        info!(pages = payloads.len(), "Sending review");
        let report = self.notifier.notify_all(&payloads).await;

        if report.failed > 0 {
            warn!(sent = report.sent, failed = report.failed, "Some pages were not delivered");
        } else {
            info!(sent = report.sent, "Code review process completed successfully");
        }
        RunOutcome::Completed(report)
    }

    fn filter(&self, event: &ChangeEvent, raw: String) -> String {
        if event.kind == EventKind::PullRequest && !self.config.pull_request.filter_diff {
            info!("Resource filtering disabled for pull requests, reviewing full diff");
            return raw;
        }

        let (filtered, stats) = filter_diff_with_stats(&raw, self.rules);
        info!(
            kept = stats.kept_files,
            dropped = stats.dropped_files,
            categories = ?stats.categories,
            "Filtered resource files from diff"
        );
        filtered
    }

    fn payloads(&self, event: &ChangeEvent, review: &str) -> Vec<WebhookPayload> {
        let template = MessageTemplate::for_event(event, &self.config.notify, Utc::now());
        let pages = paginate(review.trim_end(), self.config.notify.max_message_len);

        into_chunks(pages)
            .iter()
            .map(|chunk| template.payload_for(chunk))
            .collect()
    }
}
