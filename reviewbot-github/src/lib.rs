//! Reviewbot GitHub - GitHub integration for reviewbot
//!
//! This crate provides the repository access check and unified diff retrieval
//! used by the review pipeline.

mod client;
mod diff;
mod error;

pub use client::{split_full_name, GitHubClient};
pub use diff::DIFF_MEDIA_TYPE;
pub use error::{Error, Result};
