//! CI event interpretation
//!
//! GitHub Actions hands the triggering event to the job as a JSON file
//! (`GITHUB_EVENT_PATH`) plus its name (`GITHUB_EVENT_NAME`). This module turns
//! the two into a [`ChangeEvent`], or decides that the run has nothing to do.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Pull-request actions that produce a review
pub const REVIEWED_PR_ACTIONS: &[&str] = &["opened", "reopened", "synchronize", "ready_for_review"];

/// Kind of triggering event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Push,
    PullRequest,
    Unsupported,
}

impl EventKind {
    /// Map a `GITHUB_EVENT_NAME` value
    pub fn from_name(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "pull_request" | "pull_request_target" => EventKind::PullRequest,
            _ => EventKind::Unsupported,
        }
    }
}

/// Where the diff of a change can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiffLocator {
    /// Comparison between two revisions
    Compare { base: String, head: String },
    /// Diff of a pull request
    PullRequest { number: u64 },
    /// Direct diff URL from the payload
    Url(String),
}

impl DiffLocator {
    /// Resolve to the URL to GET, relative to the REST API base
    pub fn resolve(&self, api_base: &str, repository: &str) -> Result<Url> {
        let api = api_base.trim_end_matches('/');
        let raw = match self {
            DiffLocator::Compare { base, head } => {
                format!("{api}/repos/{repository}/compare/{base}...{head}")
            }
            DiffLocator::PullRequest { number } => format!("{api}/repos/{repository}/pulls/{number}"),
            DiffLocator::Url(url) => url.clone(),
        };

        Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid diff URL {raw}: {e}")))
    }
}

impl fmt::Display for DiffLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLocator::Compare { base, head } => write!(f, "compare {base}...{head}"),
            DiffLocator::PullRequest { number } => write!(f, "pull request #{number}"),
            DiffLocator::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A change to review, built once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    /// `owner/repo`
    pub repository: String,
    pub base_revision: Option<String>,
    pub head_revision: Option<String>,
    pub diff_locator: DiffLocator,
    /// One-line human readable title
    pub title: String,
    pub author: String,
    /// Link to the commit or pull request
    pub target_url: String,
}

/// Why a run ends without reviewing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Event name this bot does not handle
    UnsupportedEvent(String),
    /// Push that deleted a branch
    BranchDeleted,
    /// Push without a base revision (new branch or first push)
    NoBaseRevision,
    /// Push payload without `head_commit`
    MissingHeadCommit,
    /// Pull-request action that does not change code
    IgnoredAction(String),
    /// Payload shape not understood
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedEvent(name) => write!(f, "unsupported event type '{name}'"),
            SkipReason::BranchDeleted => write!(f, "push deleted the branch"),
            SkipReason::NoBaseRevision => {
                write!(f, "new branch or first push, no base revision to compare")
            }
            SkipReason::MissingHeadCommit => write!(f, "push payload has no head_commit"),
            SkipReason::IgnoredAction(action) => write!(f, "pull request action '{action}' is not reviewed"),
            SkipReason::Malformed(msg) => write!(f, "malformed event payload: {msg}"),
        }
    }
}

/// Outcome of reading the event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreted {
    Review(ChangeEvent),
    Skip(SkipReason),
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    repository: Repository,
    before: Option<String>,
    after: Option<String>,
    #[serde(default)]
    deleted: bool,
    head_commit: Option<HeadCommit>,
}

#[derive(Debug, Deserialize)]
struct HeadCommit {
    message: String,
    url: String,
    author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: Option<String>,
    repository: Repository,
    pull_request: PullRequestInfo,
}

#[derive(Debug, Deserialize)]
struct PullRequestInfo {
    number: Option<u64>,
    diff_url: Option<String>,
    title: String,
    html_url: String,
    user: PullRequestUser,
    base: Option<GitRef>,
    head: Option<GitRef>,
}

#[derive(Debug, Deserialize)]
struct PullRequestUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    sha: String,
}

/// Read the event file and interpret it.
///
/// Only I/O failures are errors; anything wrong with the content is a skip.
pub fn load_event(path: &Path, event_name: &str) -> Result<Interpreted> {
    let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
    Ok(interpret(event_name, &contents))
}

/// Interpret a raw event payload
pub fn interpret(event_name: &str, payload: &str) -> Interpreted {
    let parsed = match EventKind::from_name(event_name) {
        EventKind::Push => serde_json::from_str(payload).map(interpret_push),
        EventKind::PullRequest => serde_json::from_str(payload).map(interpret_pull_request),
        EventKind::Unsupported => {
            return Interpreted::Skip(SkipReason::UnsupportedEvent(event_name.to_string()))
        }
    };

    parsed.unwrap_or_else(|e| Interpreted::Skip(SkipReason::Malformed(e.to_string())))
}

/// True for a missing, empty or all-zero revision
fn is_null_revision(rev: Option<&str>) -> bool {
    rev.map_or(true, |r| r.chars().all(|c| c == '0'))
}

fn interpret_push(payload: PushPayload) -> Interpreted {
    if payload.deleted {
        return Interpreted::Skip(SkipReason::BranchDeleted);
    }

    if is_null_revision(payload.before.as_deref()) {
        return Interpreted::Skip(SkipReason::NoBaseRevision);
    }

    let Some(head_commit) = payload.head_commit else {
        return Interpreted::Skip(SkipReason::MissingHeadCommit);
    };

    let (Some(base), Some(head)) = (payload.before, payload.after) else {
        return Interpreted::Skip(SkipReason::Malformed("push without 'after'".to_string()));
    };

    Interpreted::Review(ChangeEvent {
        kind: EventKind::Push,
        repository: payload.repository.full_name,
        base_revision: Some(base.clone()),
        head_revision: Some(head.clone()),
        diff_locator: DiffLocator::Compare { base, head },
        title: head_commit.message.lines().next().unwrap_or_default().to_string(),
        author: head_commit.author.name,
        target_url: head_commit.url,
    })
}

fn interpret_pull_request(payload: PullRequestPayload) -> Interpreted {
    if let Some(action) = payload.action {
        if !REVIEWED_PR_ACTIONS.contains(&action.as_str()) {
            return Interpreted::Skip(SkipReason::IgnoredAction(action));
        }
    }

    let pr = payload.pull_request;
    let diff_locator = match (pr.number, pr.diff_url) {
        (Some(number), _) => DiffLocator::PullRequest { number },
        (None, Some(url)) => DiffLocator::Url(url),
        (None, None) => {
            return Interpreted::Skip(SkipReason::Malformed(
                "pull_request has neither number nor diff_url".to_string(),
            ))
        }
    };

    Interpreted::Review(ChangeEvent {
        kind: EventKind::PullRequest,
        repository: payload.repository.full_name,
        base_revision: pr.base.map(|r| r.sha),
        head_revision: pr.head.map(|r| r.sha),
        diff_locator,
        title: pr.title,
        author: pr.user.login,
        target_url: pr.html_url,
    })
}
