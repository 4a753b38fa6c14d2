use config::{Config as ConfigBuilder, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use answer_llm::retry::RetryPolicy;

use crate::error::AppError;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "answer-sheets.toml";

/// Prefix for structured environment overrides, e.g. `ANSWER_SHEETS_RUN__DELAY_SECS`
pub const ENV_PREFIX: &str = "ANSWER_SHEETS";

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const SPREADSHEET_ID_VAR: &str = "SPREADSHEET_ID";
pub const GOOGLE_SERVICE_JSON_VAR: &str = "GOOGLE_SERVICE_JSON";

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_retries: u32,
    pub backoff_secs: u64,
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    pub base_url: String,
    /// Inline service account JSON; takes precedence over the file
    #[serde(default)]
    pub service_account_json: Option<String>,
    pub service_account_file: PathBuf,
    pub sheet_rows: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub delay_secs: u64,
    pub sheet_per_row: bool,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub sheets: SheetsConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Same as [`Config::load`] with an explicit environment snapshot
    pub fn load_with_env(path: Option<&Path>, env: Map<String, String>) -> Result<Self, ConfigError> {
        let settings = ConfigBuilder::builder()
            // Set defaults
            .set_default("openai.base_url", answer_llm::openai::client::DEFAULT_BASE_URL)?
            .set_default("openai.models", vec!["gpt-4o-mini", "gpt-4o"])?
            .set_default("openai.temperature", 0.3)?
            .set_default("openai.max_output_tokens", 800)?
            .set_default("openai.max_retries", 3)?
            .set_default("openai.backoff_secs", 2)?
            .set_default("openai.fail_fast", false)?
            .set_default("sheets.base_url", crate::sheets::google::DEFAULT_BASE_URL)?
            .set_default("sheets.service_account_file", "service_account.json")?
            .set_default("sheets.sheet_rows", crate::provisioner::DEFAULT_SHEET_ROWS)?
            .set_default("run.delay_secs", 2)?
            .set_default("run.sheet_per_row", false)?
            .set_default("logging.level", "info")?;

        let settings = match path {
            // An explicit path must exist
            Some(path) => settings.add_source(File::from(path)),
            None => settings.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        let settings = settings
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("openai.models")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            // Unprefixed variables used by existing deployments
            .set_override_option("openai.api_key", non_empty(&env, OPENAI_API_KEY_VAR))?
            .set_override_option("sheets.spreadsheet_id", non_empty(&env, SPREADSHEET_ID_VAR))?
            .set_override_option(
                "sheets.service_account_json",
                non_empty(&env, GOOGLE_SERVICE_JSON_VAR),
            )?;

        settings.build()?.try_deserialize()
    }

    pub fn api_key(&self) -> Result<&str, AppError> {
        self.openai
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Config(format!("{} is not set", OPENAI_API_KEY_VAR)))
    }

    pub fn spreadsheet_id(&self) -> Result<&str, AppError> {
        self.sheets
            .spreadsheet_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Config(format!("{} is not set", SPREADSHEET_ID_VAR)))
    }

    pub fn models(&self) -> Result<&[String], AppError> {
        if self.openai.models.is_empty() {
            return Err(AppError::Config("openai.models must not be empty".to_string()));
        }
        Ok(&self.openai.models)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.openai.max_retries,
            backoff_step: Duration::from_secs(self.openai.backoff_secs),
            fail_fast_on_client_errors: self.openai.fail_fast,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.run.delay_secs)
    }
}

fn non_empty(env: &Map<String, String>, key: &str) -> Option<String> {
    env.get(key).filter(|value| !value.is_empty()).cloned()
}
