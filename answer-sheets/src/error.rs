use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::sheets::SheetsError;

/// Top-level error for an answer-sheets run
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service account credentials or token exchange failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Spreadsheet provisioning or row append failed
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// Prompt catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Text generation client could not be constructed
    #[error("LLM client error: {0}")]
    Llm(#[from] answer_llm::LlmError),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Get the process exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Auth(_) => 3,
            AppError::Catalog(_) => 4,
            AppError::Sheets(_) => 5,
            AppError::Llm(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            AppError::Config("x".into()),
            AppError::Auth(AuthError::MissingCredentials("x".into())),
            AppError::Catalog(CatalogError::Empty),
            AppError::Sheets(SheetsError::WorksheetNotFound("x".into())),
            AppError::Llm(answer_llm::LlmError::internal("x")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(AppError::exit_code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }
}
