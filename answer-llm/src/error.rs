use thiserror::Error;

/// Error types for a single Responses API call
#[derive(Error, Debug)]
pub enum LlmError {
    /// Authentication failed (HTTP 401/403)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Invalid request parameters (HTTP 400/413)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// API error with status code (HTTP 4xx/5xx except above)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// JSON parsing or serialization error
    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// Generic error for unexpected cases
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api_error(status: u16, message: String) -> Self {
        Self::Api { status, message }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Authentication failures, malformed requests and 404s are client-side
    /// problems that a retry will not fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::InvalidRequest { .. } => false,
            Self::Api { status, .. } => *status != 404,
            Self::RateLimit { .. }
            | Self::Network { .. }
            | Self::Parse { .. }
            | Self::Internal { .. } => true,
        }
    }
}

/// Failure of a [`crate::retry::RetryingCaller::generate`] call after its retry loop.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Every attempt failed
    #[error("no response from {model} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        model: String,
        attempts: u32,
        #[source]
        last_error: LlmError,
    },

    /// A client error stopped the loop early (only with fail-fast enabled)
    #[error("{model} rejected the request on attempt {attempt}: {source}")]
    NonRetryable {
        model: String,
        attempt: u32,
        #[source]
        source: LlmError,
    },
}

impl GenerationError {
    /// Number of HTTP attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } => *attempts,
            Self::NonRetryable { attempt, .. } => *attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(!LlmError::authentication("bad key").is_retryable());
        assert!(!LlmError::invalid_request("bad body").is_retryable());
        assert!(!LlmError::api_error(404, "no model".into()).is_retryable());
        assert!(LlmError::api_error(500, "boom".into()).is_retryable());
        assert!(LlmError::api_error(503, "busy".into()).is_retryable());
        assert!(LlmError::rate_limit("slow down", Some(3)).is_retryable());
        assert!(LlmError::internal("garbled body").is_retryable());
        let parse = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(LlmError::from(parse).is_retryable());
    }

    #[test]
    fn test_generation_error_attempts() {
        let err = GenerationError::RetriesExhausted {
            model: "gpt-4o".to_string(),
            attempts: 3,
            last_error: LlmError::api_error(500, "boom".into()),
        };
        assert_eq!(err.attempts(), 3);
        assert!(err.to_string().contains("after 3 attempts"));
    }
}
