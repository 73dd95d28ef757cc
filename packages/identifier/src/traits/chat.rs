//! Chat completion seam for the inference pipeline.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::request::TokenUsage;

/// One completed inference call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The model's raw text output
    pub content: String,

    /// Token accounting, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// Chat completion seam.
///
/// Implementations wrap a specific inference provider and handle transport;
/// classification of failures into transient/permanent happens in the error
/// conversion, not here.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a system + user prompt to `model` and return its raw output.
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<Completion>;
}

#[async_trait]
impl ChatApi for openai_client::OpenAIClient {
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<Completion> {
        let request = openai_client::ChatRequest::new(model)
            .message(openai_client::Message::system(system))
            .message(openai_client::Message::user(user))
            .temperature(0.0)
            .max_tokens(4000);

        let response = self.chat_completion(request).await?;

        Ok(Completion {
            content: response.content,
            usage: response.usage.map(TokenUsage::from),
        })
    }
}
