use chrono::Datelike;
use tracing::info;

use crate::sheets::{SheetsError, ValueInputOption, Workbook, WorksheetHandle};

/// Header row of every monthly worksheet, in column order
pub const HEADER: [&str; 7] = [
    "Timestamp",
    "Model",
    "Category",
    "Attribute",
    "Prompt",
    "Answer",
    "BatchDate",
];

/// Row capacity of newly created worksheets
pub const DEFAULT_SHEET_ROWS: u32 = 1000;

/// `Answers_<year>_<month:02>` for the month containing `date`
pub fn monthly_sheet_name(date: &impl Datelike) -> String {
    format!("Answers_{}_{:02}", date.year(), date.month())
}

/// Makes sure the worksheet for a calendar month exists and carries the header
#[derive(Debug, Clone)]
pub struct SheetProvisioner {
    rows: u32,
}

impl Default for SheetProvisioner {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_ROWS)
    }
}

impl SheetProvisioner {
    pub fn new(rows: u32) -> Self {
        Self { rows }
    }

    pub async fn ensure_monthly_sheet(
        &self,
        workbook: &dyn Workbook,
        now: &impl Datelike,
    ) -> Result<WorksheetHandle, SheetsError> {
        let sheet_name = monthly_sheet_name(now);

        match workbook.worksheet(&sheet_name).await {
            Ok(sheet) => {
                if workbook.row_count(&sheet).await? == 0 {
                    append_header(workbook, &sheet).await?;
                    info!("Added header to existing worksheet {}", sheet_name);
                }
                Ok(sheet)
            }
            Err(SheetsError::WorksheetNotFound(_)) => {
                let sheet = workbook
                    .add_worksheet(&sheet_name, self.rows, HEADER.len() as u32)
                    .await?;
                append_header(workbook, &sheet).await?;
                info!("Created worksheet {}", sheet_name);
                Ok(sheet)
            }
            Err(e) => Err(e),
        }
    }
}

async fn append_header(workbook: &dyn Workbook, sheet: &WorksheetHandle) -> Result<(), SheetsError> {
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    workbook
        .append_row(sheet, &header, ValueInputOption::Raw)
        .await
}
