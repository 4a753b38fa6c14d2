use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use answer_llm::{openai::OpenAIClient, RetryingCaller};
use answer_sheets::{
    auth::{CredentialSource, ServiceAccountTokenProvider},
    provisioner::SheetProvisioner,
    sheets::GoogleSheetsClient,
    AppError, Config, PromptCatalog, RunOptions, RunSummary, Runner,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "answer-sheets")]
#[command(about = "Collect model answers for a prompt catalog into Google Sheets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Prompt catalog JSON (defaults to the bundled catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only process the first N prompts
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,
}

impl Cli {
    pub async fn run(&self, config: &Config) -> Result<RunSummary, AppError> {
        let models = config.models()?.to_vec();

        let credentials = CredentialSource::from_config(&config.sheets);
        info!("Loading service account credentials from {}", credentials.describe());
        let token_provider = ServiceAccountTokenProvider::new(credentials.load()?)?;
        info!(client_email = %token_provider.client_email(), "Authorized service account");

        let workbook = GoogleSheetsClient::new(config.spreadsheet_id()?, Arc::new(token_provider))?
            .with_base_url(&config.sheets.base_url)
            .open()
            .await?;

        let catalog_path = self.catalog.as_deref().or(config.run.catalog_path.as_deref());
        let mut catalog = PromptCatalog::load(catalog_path)?;
        if let Some(limit) = self.limit {
            catalog = catalog.truncated(limit as usize);
        }
        info!(
            prompts = catalog.len(),
            models = models.len(),
            "Starting batch of {} calls",
            catalog.len() * models.len()
        );

        let client = OpenAIClient::new(config.api_key()?)?.with_base_url(&config.openai.base_url);
        let caller = RetryingCaller::new(Arc::new(client))
            .with_policy(config.retry_policy())
            .with_temperature(config.openai.temperature)
            .with_max_output_tokens(config.openai.max_output_tokens);

        let runner = Runner::new(caller, Arc::new(workbook))
            .with_provisioner(SheetProvisioner::new(config.sheets.sheet_rows))
            .with_options(RunOptions {
                delay: config.delay(),
                sheet_per_row: config.run.sheet_per_row,
            });

        Ok(runner.run(&catalog, &models).await?)
    }
}
