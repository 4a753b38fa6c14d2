//! Bounded retry around a single Responses API call.
//!
//! [`RetryingCaller::generate`] makes up to [`RetryPolicy::max_attempts`]
//! requests through `tokio_retry2`, sleeping a linearly growing delay after
//! each failure (`backoff_step * (attempt + 1)`). Every failure class is
//! retried unless [`RetryPolicy::fail_fast_on_client_errors`] is set.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

use crate::{
    client::ResponsesClient,
    error::{GenerationError, LlmError},
    openai::types::OpenAIResponseRequest,
};

/// Maximum number of HTTP attempts per prompt
pub const MAX_RETRY: u32 = 3;

/// Unit of the linear backoff between attempts
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(2);

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
    /// Stop on 400/401/403/404/413 instead of retrying them
    pub fail_fast_on_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY,
            backoff_step: DEFAULT_BACKOFF_STEP,
            fail_fast_on_client_errors: false,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt with the given zero-based index
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * (attempt + 1)
    }

    /// Linear delays between consecutive attempts, without jitter
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        let step = self.backoff_step;
        (1..self.max_attempts.max(1)).map(move |n| step * n)
    }

    /// Whether `err` ends the loop without further attempts
    pub fn stops_on(&self, err: &LlmError) -> bool {
        self.fail_fast_on_client_errors && !err.is_retryable()
    }
}

/// Wraps a [`ResponsesClient`] with fixed generation settings and a retry loop
pub struct RetryingCaller {
    client: Arc<dyn ResponsesClient>,
    policy: RetryPolicy,
    temperature: f32,
    max_output_tokens: u32,
}

impl RetryingCaller {
    pub fn new(client: Arc<dyn ResponsesClient>) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate an answer for `prompt` with `model`.
    ///
    /// Returns the trimmed text on the first successful attempt. An empty
    /// string is a success: the model answered with no text content.
    ///
    /// Every failed attempt is followed by its backoff, the last one
    /// included, so an exhausted call has waited `2 + 4 + 6` steps.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0u32;

        let result = Retry::spawn(self.policy.strategy(), || {
            attempts += 1;
            let attempt = attempts;
            let request = OpenAIResponseRequest::new(model, prompt)
                .with_temperature(self.temperature)
                .with_max_output_tokens(self.max_output_tokens);

            async move {
                match self.client.create_response(request).await {
                    Ok(response) => Ok(response.text()),
                    Err(err) => {
                        warn!(
                            provider = self.client.provider_name(),
                            model,
                            attempt,
                            max_attempts,
                            "Generation attempt failed: {}",
                            err
                        );
                        if self.policy.stops_on(&err) {
                            Err(RetryError::Permanent(err))
                        } else {
                            debug!(model, "Backing off {:?}", self.policy.backoff_for(attempt - 1));
                            Err(RetryError::Transient {
                                err,
                                retry_after: None,
                            })
                        }
                    }
                }
            }
        })
        .await;

        match result {
            Ok(text) => Ok(text),
            Err(err) if self.policy.stops_on(&err) => Err(GenerationError::NonRetryable {
                model: model.to_string(),
                attempt: attempts,
                source: err,
            }),
            Err(err) => {
                // The strategy only covers the gaps between attempts
                tokio::time::sleep(self.policy.backoff_for(attempts - 1)).await;
                Err(GenerationError::RetriesExhausted {
                    model: model.to_string(),
                    attempts,
                    last_error: err,
                })
            }
        }
    }
}
