use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{SheetsError, ValueInputOption, Workbook, WorksheetHandle};

#[derive(Debug, Clone)]
struct MemorySheet {
    handle: WorksheetHandle,
    rows: Vec<Vec<String>>,
    options: Vec<ValueInputOption>,
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<MemorySheet>,
    created: usize,
    fail_appends_after: Option<usize>,
    appends: usize,
}

/// Process-local [`Workbook`] for tests; clones share the same sheets
#[derive(Clone, Default)]
pub struct InMemoryWorkbook {
    state: Arc<Mutex<State>>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock still yields the data
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a worksheet with existing rows
    pub fn with_worksheet(self, title: &str, rows: Vec<Vec<String>>) -> Self {
        {
            let mut state = self.lock();
            let sheet_id = state.sheets.len() as i64;
            state.sheets.push(MemorySheet {
                handle: WorksheetHandle {
                    sheet_id,
                    title: title.to_string(),
                },
                options: vec![ValueInputOption::Raw; rows.len()],
                rows,
            });
        }
        self
    }

    /// Make every append after the first `n` fail
    pub fn fail_appends_after(self, n: usize) -> Self {
        self.lock().fail_appends_after = Some(n);
        self
    }

    pub fn rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        self.lock()
            .sheets
            .iter()
            .find(|s| s.handle.title == title)
            .map(|s| s.rows.clone())
    }

    pub fn value_input_options(&self, title: &str) -> Option<Vec<ValueInputOption>> {
        self.lock()
            .sheets
            .iter()
            .find(|s| s.handle.title == title)
            .map(|s| s.options.clone())
    }

    pub fn titles(&self) -> Vec<String> {
        self.lock()
            .sheets
            .iter()
            .map(|s| s.handle.title.clone())
            .collect()
    }

    /// Number of `add_worksheet` calls served
    pub fn created_count(&self) -> usize {
        self.lock().created
    }
}

#[async_trait]
impl Workbook for InMemoryWorkbook {
    async fn worksheet(&self, title: &str) -> Result<WorksheetHandle, SheetsError> {
        self.lock()
            .sheets
            .iter()
            .find(|s| s.handle.title == title)
            .map(|s| s.handle.clone())
            .ok_or_else(|| SheetsError::WorksheetNotFound(title.to_string()))
    }

    async fn row_count(&self, sheet: &WorksheetHandle) -> Result<usize, SheetsError> {
        self.lock()
            .sheets
            .iter()
            .find(|s| s.handle == *sheet)
            .map(|s| s.rows.len())
            .ok_or_else(|| SheetsError::WorksheetNotFound(sheet.title.clone()))
    }

    async fn add_worksheet(
        &self,
        title: &str,
        _rows: u32,
        _cols: u32,
    ) -> Result<WorksheetHandle, SheetsError> {
        let mut state = self.lock();
        if state.sheets.iter().any(|s| s.handle.title == title) {
            return Err(SheetsError::WorksheetExists(title.to_string()));
        }

        let handle = WorksheetHandle {
            sheet_id: state.sheets.len() as i64,
            title: title.to_string(),
        };
        state.sheets.push(MemorySheet {
            handle: handle.clone(),
            rows: Vec::new(),
            options: Vec::new(),
        });
        state.created += 1;
        Ok(handle)
    }

    async fn append_row(
        &self,
        sheet: &WorksheetHandle,
        values: &[String],
        option: ValueInputOption,
    ) -> Result<(), SheetsError> {
        let mut state = self.lock();
        if let Some(limit) = state.fail_appends_after {
            if state.appends >= limit {
                return Err(SheetsError::Api {
                    status: 503,
                    message: "append rejected".to_string(),
                });
            }
        }

        let target = state
            .sheets
            .iter_mut()
            .find(|s| s.handle == *sheet)
            .ok_or_else(|| SheetsError::WorksheetNotFound(sheet.title.clone()))?;
        target.rows.push(values.to_vec());
        target.options.push(option);
        state.appends += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_append() {
        let workbook = InMemoryWorkbook::new();
        let sheet = workbook.add_worksheet("Answers_2025_03", 1000, 7).await.unwrap();

        workbook
            .append_row(&sheet, &["a".to_string()], ValueInputOption::UserEntered)
            .await
            .unwrap();

        assert_eq!(workbook.row_count(&sheet).await.unwrap(), 1);
        assert_eq!(workbook.rows("Answers_2025_03").unwrap(), vec![vec!["a"]]);
        assert_eq!(workbook.created_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_worksheet() {
        let workbook = InMemoryWorkbook::new();
        let result = workbook.worksheet("nope").await;
        assert!(matches!(result, Err(SheetsError::WorksheetNotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_title_rejected() {
        let workbook = InMemoryWorkbook::new().with_worksheet("Sheet1", Vec::new());
        let result = workbook.add_worksheet("Sheet1", 10, 7).await;
        assert!(matches!(result, Err(SheetsError::WorksheetExists(_))));
    }

    #[tokio::test]
    async fn test_append_failure_injection() {
        let workbook = InMemoryWorkbook::new()
            .with_worksheet("Sheet1", Vec::new())
            .fail_appends_after(1);
        let sheet = workbook.worksheet("Sheet1").await.unwrap();
        let row = vec!["x".to_string()];

        assert!(workbook
            .append_row(&sheet, &row, ValueInputOption::Raw)
            .await
            .is_ok());
        assert!(workbook
            .append_row(&sheet, &row, ValueInputOption::Raw)
            .await
            .is_err());
    }
}
