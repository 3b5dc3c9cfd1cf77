//! Reviewbot Core - diff review pipeline for CI runs
//!
//! This crate turns a CI event into a code review posted to a chat channel:
//! it classifies changed files, strips resource-file sections from the diff,
//! asks a language model for a review and splits the result into chat-sized
//! messages. Source-control access is abstracted behind [`DiffSource`].

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod notify;
pub mod paginate;
pub mod pipeline;
pub mod review;
pub mod secrets;

pub use classify::{FileClassification, ResourceRules};
pub use config::Config;
pub use diff::{filter_diff, DiffStats};
pub use error::{Error, Result};
pub use event::{ChangeEvent, DiffLocator, EventKind, Interpreted, SkipReason};
pub use notify::{ChatSink, DeliveryReport, DiscordWebhook, Notifier, WebhookPayload};
pub use paginate::{paginate, MessageChunk};
pub use pipeline::{DiffSource, Pipeline, RunOutcome};
pub use review::{GeminiModel, ReviewModel, ReviewRequester};
pub use secrets::Secrets;
