use clap::Parser;
use tracing::{debug, info};

mod cli;

use answer_sheets::{logging::init_logging, AppError, Config};
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging depends on the configured level, so config errors go to stderr
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let e = AppError::from(e);
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    init_logging(cli.verbose, &config.logging.level)?;

    info!("answer-sheets starting");
    debug!("CLI arguments: {:?}", cli);

    match cli.run(&config).await {
        Ok(summary) => {
            info!(
                rows = summary.rows_written,
                failures = summary.failed_generations,
                sheets = ?summary.sheets,
                "answer-sheets completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("answer-sheets error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
