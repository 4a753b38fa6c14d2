//! Service account credentials and OAuth access tokens for the Sheets API.

mod credentials;
mod token;

pub use credentials::{CredentialSource, ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use token::{
    AssertionClaims, ServiceAccountTokenProvider, StaticToken, TokenProvider, DRIVE_SCOPE,
    SPREADSHEETS_SCOPE,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Service account credentials not available: {0}")]
    MissingCredentials(String),

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to parse service account or token JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Token exchange failed (status {status}): {message}")]
    TokenExchange { status: u16, message: String },

    #[error("Network error during token exchange: {source}")]
    Network { source: reqwest::Error },
}
