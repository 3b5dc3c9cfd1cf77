//! Language-model abstraction

use async_trait::async_trait;

use crate::Result;

/// A service that turns a prompt into review text
#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;
}
