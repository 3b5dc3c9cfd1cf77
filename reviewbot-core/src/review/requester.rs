//! Review requests with placeholder fallbacks

use tracing::{error, info};

use super::{prompt, ReviewModel};

/// Returned when no model is configured
pub const NO_MODEL_TEXT: &str = "Gemini 모델이 초기화되지 않았습니다. API 키를 확인해주세요.";

/// Returned when the diff has nothing to review
pub const EMPTY_DIFF_TEXT: &str = "코드 변경 사항이 없어 리뷰를 생성할 수 없습니다.";

/// Prefix of the text returned when generation fails
pub const FAILURE_PREFIX: &str = "코드 리뷰 생성 중 오류가 발생했습니다";

/// Requests one review per diff and never fails
pub struct ReviewRequester {
    model: Option<Box<dyn ReviewModel>>,
}

impl ReviewRequester {
    pub fn new(model: Box<dyn ReviewModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Requester that always answers with [`NO_MODEL_TEXT`]
    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    /// Review `diff`, or explain in the returned text why there is no review
    pub async fn request_review(&self, diff: &str) -> String {
        let Some(model) = &self.model else {
            return NO_MODEL_TEXT.to_string();
        };

        if diff.trim().is_empty() {
            return EMPTY_DIFF_TEXT.to_string();
        }

        let prompt = prompt::render(diff);
        info!(model = model.name(), diff_len = diff.len(), "Requesting review");

        match model.generate(&prompt).await {
            Ok(text) => {
                info!(review_len = text.chars().count(), "Review generated");
                text
            }
            Err(e) => {
                error!(model = model.name(), error = %e, "Error generating code review");
                format!("{FAILURE_PREFIX}: {e}")
            }
        }
    }
}

impl std::fmt::Debug for ReviewRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewRequester")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FakeModel {
        reply: std::result::Result<String, u16>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ReviewModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|status| Error::Service {
                service: "fake",
                status,
                body: "overloaded".to_string(),
            })
        }
    }

    fn requester(reply: std::result::Result<String, u16>) -> (ReviewRequester, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let model = FakeModel {
            reply,
            prompts: Arc::clone(&prompts),
        };
        (ReviewRequester::new(Box::new(model)), prompts)
    }

    #[tokio::test]
    async fn test_returns_model_text_verbatim() {
        let (requester, prompts) = requester(Ok("  리뷰 결과\n".to_string()));
        let review = requester.request_review("+fn x() {}").await;

        assert_eq!(review, "  리뷰 결과\n");
        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("+fn x() {}"));
    }

    #[tokio::test]
    async fn test_empty_diff_skips_model() {
        let (requester, prompts) = requester(Ok("unused".to_string()));
        assert_eq!(requester.request_review(" \n\t").await, EMPTY_DIFF_TEXT);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_becomes_placeholder() {
        let (requester, _) = requester(Err(503));
        let review = requester.request_review("+x").await;
        assert!(review.starts_with(FAILURE_PREFIX));
        assert!(review.contains("503"));
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let requester = ReviewRequester::unconfigured();
        assert_eq!(requester.request_review("+x").await, NO_MODEL_TEXT);
    }
}
