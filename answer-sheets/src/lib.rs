//! # answer-sheets
//!
//! Sends every prompt of a catalog to a list of OpenAI models and appends
//! one row per (prompt, model) pair to a monthly worksheet
//! (`Answers_<year>_<month>`) in a Google spreadsheet.
//!
//! The pieces compose as:
//!
//! - [`config::Config`] layers defaults, a TOML file and the environment
//! - [`auth`] turns a service account key into Sheets API bearer tokens
//! - [`sheets::Workbook`] abstracts the spreadsheet; [`sheets::GoogleSheetsClient`]
//!   is the REST implementation
//! - [`provisioner::SheetProvisioner`] makes sure the month's worksheet has its header
//! - [`runner::Runner`] drives the catalog through [`answer_llm::RetryingCaller`]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod provisioner;
pub mod runner;
pub mod sheets;

pub use catalog::{PromptCatalog, PromptRecord};
pub use config::Config;
pub use error::AppError;
pub use runner::{RunOptions, RunSummary, Runner};
