//! Orchestration loop: every (prompt, model) pair becomes one appended row.
//!
//! Rows are appended one at a time as answers arrive, so an interrupted run
//! leaves a prefix of the catalog in the sheet. Re-running starts over and
//! duplicates rows that were already written.

use std::sync::Arc;
use std::time::Duration;

use answer_llm::retry::RetryingCaller;
use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::catalog::{PromptCatalog, PromptRecord};
use crate::provisioner::{monthly_sheet_name, SheetProvisioner};
use crate::sheets::{SheetsError, ValueInputOption, Workbook, WorksheetHandle};

/// Written in the Answer column when generation fails after all retries
pub const SENTINEL_ANSWER: &str = "[오류: 응답 실패]";

pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BATCH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of local wall-clock time
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| chrono::Local::now().naive_local())
}

/// One output row, in header column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub timestamp: String,
    pub model: String,
    pub category: String,
    pub attribute: String,
    pub prompt: String,
    pub answer: String,
    pub batch_date: String,
}

impl AnswerRow {
    pub fn new(
        at: NaiveDateTime,
        model: &str,
        record: &PromptRecord,
        answer: String,
        batch_date: &str,
    ) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            model: model.to_string(),
            category: record.category.clone(),
            attribute: record.attribute.clone(),
            prompt: record.prompt.clone(),
            answer,
            batch_date: batch_date.to_string(),
        }
    }

    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.model,
            self.category,
            self.attribute,
            self.prompt,
            self.answer,
            self.batch_date,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause after every (prompt, model) call
    pub delay: Duration,
    /// Re-resolve the monthly worksheet before each row instead of once at start
    pub sheet_per_row: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            sheet_per_row: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_written: usize,
    pub failed_generations: usize,
    /// Worksheets written to, in order of first use
    pub sheets: Vec<String>,
}

pub struct Runner {
    caller: RetryingCaller,
    workbook: Arc<dyn Workbook>,
    provisioner: SheetProvisioner,
    options: RunOptions,
    clock: Clock,
}

impl Runner {
    pub fn new(caller: RetryingCaller, workbook: Arc<dyn Workbook>) -> Self {
        Self {
            caller,
            workbook,
            provisioner: SheetProvisioner::default(),
            options: RunOptions::default(),
            clock: local_clock(),
        }
    }

    pub fn with_provisioner(mut self, provisioner: SheetProvisioner) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Process every catalog record with every model, in order.
    ///
    /// Generation failures are recorded as [`SENTINEL_ANSWER`] and the run
    /// continues; provisioning and append failures end the run.
    pub async fn run(
        &self,
        catalog: &PromptCatalog,
        models: &[String],
    ) -> Result<RunSummary, SheetsError> {
        let started_at = (self.clock)();
        let batch_date = started_at.format(BATCH_DATE_FORMAT).to_string();
        let mut summary = RunSummary::default();

        let mut sheet = self
            .provisioner
            .ensure_monthly_sheet(self.workbook.as_ref(), &started_at)
            .await?;
        summary.sheets.push(sheet.title.clone());

        let total = catalog.len();
        for (i, record) in catalog.iter().enumerate() {
            for model in models {
                let at = (self.clock)();
                if self.options.sheet_per_row {
                    sheet = self.resolve_sheet(sheet, &at, &mut summary).await?;
                }

                info!(
                    "[{}/{}] {} → {} / {}",
                    i + 1,
                    total,
                    model,
                    record.category,
                    record.attribute
                );

                let answer = match self.caller.generate(model, &record.prompt).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        error!(prompt = record.sequence_number, "{}", e);
                        summary.failed_generations += 1;
                        SENTINEL_ANSWER.to_string()
                    }
                };

                let row = AnswerRow::new(at, model, record, answer, &batch_date);
                self.workbook
                    .append_row(&sheet, &row.into_cells(), ValueInputOption::UserEntered)
                    .await?;
                summary.rows_written += 1;
                info!("→ saved to {} ({}/{})", sheet.title, i + 1, total);

                tokio::time::sleep(self.options.delay).await;
            }
        }

        info!(
            rows = summary.rows_written,
            failures = summary.failed_generations,
            "All prompts processed"
        );
        Ok(summary)
    }

    async fn resolve_sheet(
        &self,
        current: WorksheetHandle,
        at: &NaiveDateTime,
        summary: &mut RunSummary,
    ) -> Result<WorksheetHandle, SheetsError> {
        if monthly_sheet_name(at) == current.title {
            return Ok(current);
        }

        let sheet = self
            .provisioner
            .ensure_monthly_sheet(self.workbook.as_ref(), at)
            .await?;
        info!("Month changed, now writing to {}", sheet.title);
        summary.sheets.push(sheet.title.clone());
        Ok(sheet)
    }
}
