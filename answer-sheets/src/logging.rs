use crate::error::AppError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with environment-based log level filtering.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// configured level applies.
pub fn init_logging(verbose: bool, configured_level: &str) -> Result<(), AppError> {
    let default_level = if verbose { "debug" } else { configured_level };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AppError::Config(format!("Failed to create log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_once() {
        // Only the first global subscriber can be installed per process.
        let _ = init_logging(false, "info");
        assert!(init_logging(true, "info").is_err());
    }
}
