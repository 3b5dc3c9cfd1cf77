//! Webhook message payloads

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::NotifyConfig;
use crate::event::ChangeEvent;
use crate::paginate::MessageChunk;

/// Longest embed title the chat platform accepts
pub const MAX_TITLE_CHARS: usize = 256;

/// Top-level webhook body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

/// Rich embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub footer: Footer,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub text: String,
}

/// Fields shared by every page of one review
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    username: String,
    color: u32,
    title: String,
    url: String,
    footer: String,
    timestamp: Option<String>,
}

impl MessageTemplate {
    /// Template for a review of `event`, stamped with `now`
    pub fn for_event(event: &ChangeEvent, config: &NotifyConfig, now: DateTime<Utc>) -> Self {
        Self {
            username: config.username.clone(),
            color: config.color,
            title: format!("🤖 코드 리뷰: {}", event.title),
            url: event.target_url.clone(),
            footer: format!("작성자: {} | 레포지토리: {}", event.author, event.repository),
            timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    /// Payload carrying one page
    pub fn payload_for(&self, chunk: &MessageChunk) -> WebhookPayload {
        let suffix = if chunk.is_paged() {
            format!(" ({}/{})", chunk.index, chunk.total)
        } else {
            String::new()
        };

        let budget = MAX_TITLE_CHARS.saturating_sub(suffix.chars().count());
        let title = format!("{}{}", truncate_chars(&self.title, budget), suffix);

        WebhookPayload {
            username: self.username.clone(),
            embeds: vec![Embed {
                title,
                url: self.url.clone(),
                color: self.color,
                footer: Footer {
                    text: self.footer.clone(),
                },
                description: chunk.body.clone(),
                timestamp: self.timestamp.clone(),
            }],
        }
    }
}

/// Cut `s` to at most `max` chars, marking the cut with an ellipsis
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
