//! Review prompt template
//!
//! The template is embedded at build time and carries a single `{{DIFF}}`
//! placeholder.

const REVIEW_PROMPT: &str = include_str!("prompts/review.md");

const DIFF_PLACEHOLDER: &str = "{{DIFF}}";

/// Render the review prompt with `diff` embedded verbatim
pub fn render(diff: &str) -> String {
    REVIEW_PROMPT.replace(DIFF_PLACEHOLDER, diff)
}
