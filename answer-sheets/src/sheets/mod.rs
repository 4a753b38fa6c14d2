//! Workbook abstraction over a spreadsheet service.
//!
//! [`Workbook`] is the seam between the provisioner/runner and the remote
//! service. [`google::GoogleSheetsClient`] talks to the Sheets v4 REST API.
//! Unit tests use an in-process workbook from the `memory` module.

use async_trait::async_trait;

use crate::auth::AuthError;

pub mod google;
#[cfg(test)]
pub(crate) mod memory;

pub use google::GoogleSheetsClient;
#[cfg(test)]
pub(crate) use memory::InMemoryWorkbook;

/// Reference to one worksheet (tab) of a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetHandle {
    pub sheet_id: i64,
    pub title: String,
}

/// How the service interprets appended values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Store values exactly as given
    Raw,
    /// Parse values as if typed into the UI (dates become dates)
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

#[async_trait]
pub trait Workbook: Send + Sync {
    /// Look up a worksheet by title; `SheetsError::WorksheetNotFound` when absent
    async fn worksheet(&self, title: &str) -> Result<WorksheetHandle, SheetsError>;

    /// Number of rows holding values
    async fn row_count(&self, sheet: &WorksheetHandle) -> Result<usize, SheetsError>;

    async fn add_worksheet(
        &self,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<WorksheetHandle, SheetsError>;

    /// Append one row after the last row holding values
    async fn append_row(
        &self,
        sheet: &WorksheetHandle,
        values: &[String],
        option: ValueInputOption,
    ) -> Result<(), SheetsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Worksheet already exists: {0}")]
    WorksheetExists(String),

    #[error("Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected Sheets API response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
