//! OpenAI Responses API types.
//!
//! - **Endpoint:** `/v1/responses`
//! - **Request Type:** [`OpenAIResponseRequest`]
//! - **Response Type:** [`OpenAIResponseResponse`]
//!
//! The response body arrives in one of two shapes: a flat `output_text`
//! convenience field, or a list of output items each holding content blocks.
//! [`OpenAIResponseResponse::text`] folds both into a single string.
//!
//! ### Example
//!
//! ```rust,no_run
//! use answer_llm::openai::{OpenAIClient, OpenAIResponseRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAIClient::new("your-api-key")?;
//! let request = OpenAIResponseRequest::new("gpt-4o-mini", "Recommend a compact sedan")
//!     .with_temperature(0.3)
//!     .with_max_output_tokens(800);
//! let response = client.create_response(request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

/// Separator placed between text fragments gathered from output items
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// OpenAI Responses API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIResponseRequest {
    /// The model to use for generation
    pub model: String,
    /// Input text for the response
    pub input: String,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl OpenAIResponseRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// OpenAI Responses API response
///
/// Every field is optional so that both the flat and the itemized shapes
/// deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAIResponseResponse {
    /// Unique identifier for the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model used for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Status of the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Aggregated text, present on some SDK-shaped payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    /// Output items from the response
    #[serde(default)]
    pub output: Vec<OpenAIOutputItem>,
    /// Token usage information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIResponseResponse {
    /// Generated text, trimmed.
    ///
    /// Prefers `output_text`; otherwise joins every content block's text in
    /// encounter order. A response with no text at all yields `""`.
    pub fn text(&self) -> String {
        if let Some(text) = &self.output_text {
            return text.trim().to_string();
        }

        self.output
            .iter()
            .filter_map(|item| item.content.as_ref())
            .flatten()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
            .trim()
            .to_string()
    }
}

/// Output item in Responses API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIOutputItem {
    /// Unique identifier for the output item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type of the output item ("message", "reasoning", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Role of the output item (for message types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content of the output item (for message types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<OpenAIContentBlock>>,
}

/// Content block in output item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIContentBlock {
    /// Type of content
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

/// OpenAI API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIErrorResponse {
    /// Error details
    pub error: OpenAIError,
}

/// OpenAI API error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIError {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
