use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    error::LlmError,
    openai::types::{OpenAIErrorResponse, OpenAIResponseRequest, OpenAIResponseResponse},
};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI Responses API client
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minute timeout
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a response using the OpenAI Responses API
    pub async fn create_response(
        &self,
        request: OpenAIResponseRequest,
    ) -> Result<OpenAIResponseResponse, LlmError> {
        let url = format!("{}/v1/responses", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(model = %request.model, "POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| LlmError::Network { source: e })?;
            let openai_response: OpenAIResponseResponse = serde_json::from_str(&body)?;
            Ok(openai_response)
        } else {
            // Extract retry-after header before consuming the response
            let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
            } else {
                None
            };

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
                .map(|error_response| error_response.error.message)
                .unwrap_or(error_text);

            Err(error_for_status(status, message, retry_after))
        }
    }
}

fn error_for_status(
    status: reqwest::StatusCode,
    message: String,
    retry_after: Option<u64>,
) -> LlmError {
    match status {
        reqwest::StatusCode::BAD_REQUEST => LlmError::invalid_request(message),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::authentication(message)
        }
        reqwest::StatusCode::PAYLOAD_TOO_LARGE => LlmError::invalid_request("Request too large"),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limit(message, retry_after),
        _ => LlmError::api_error(status.as_u16(), message),
    }
}

#[async_trait]
impl crate::client::ResponsesClient for OpenAIClient {
    async fn create_response(
        &self,
        request: OpenAIResponseRequest,
    ) -> Result<OpenAIResponseResponse, LlmError> {
        OpenAIClient::create_response(self, request).await
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_client_creation() {
        assert!(OpenAIClient::new("test-key").is_ok());
    }

    #[test]
    fn test_client_creation_empty_key() {
        let result = OpenAIClient::new("");
        assert!(matches!(result, Err(LlmError::Authentication { .. })));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAIClient::new("k")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, "no".into(), None),
            LlmError::Authentication { .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, "slow".into(), Some(7)),
            LlmError::RateLimit {
                retry_after: Some(7),
                ..
            }
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "gw".into(), None),
            LlmError::Api { status: 502, .. }
        ));
    }
}
