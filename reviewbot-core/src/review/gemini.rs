//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ReviewConfig;
use crate::{Error, Result};

use super::ReviewModel;

const SERVICE: &str = "Gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(Error::Other(format!(
                "{SERVICE} returned no candidates (block reason: {})",
                block_reason.as_deref().unwrap_or("none")
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Other(format!(
                "{SERVICE} returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

/// Gemini model reached over the generative language REST API
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    /// Create a client for the configured model
    pub fn new(config: &ReviewConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create {SERVICE} client: {e}")))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Full `generateContent` URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReviewModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("Gemini request")
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
            warn!(status = status.as_u16(), "Gemini request failed");
            return Err(Error::Service {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text()
    }
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
