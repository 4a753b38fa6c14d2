use crate::{
    error::LlmError,
    openai::types::{OpenAIResponseRequest, OpenAIResponseResponse},
};
use async_trait::async_trait;

/// Core trait for clients of a Responses-style text generation API
#[async_trait]
pub trait ResponsesClient: Send + Sync {
    /// Issue a single request; no retries happen at this layer
    async fn create_response(
        &self,
        request: OpenAIResponseRequest,
    ) -> Result<OpenAIResponseResponse, LlmError>;

    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;
}
