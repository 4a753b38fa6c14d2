use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bundled car-recommendation prompt set
const BUILTIN_CATALOG: &str = include_str!("../data/prompts.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(rename = "No", alias = "no")]
    pub sequence_number: u32,
    #[serde(rename = "Category", alias = "category")]
    pub category: String,
    #[serde(rename = "Attribute", alias = "attribute")]
    pub attribute: String,
    #[serde(rename = "Prompt", alias = "prompt")]
    pub prompt: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read prompt catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse prompt catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt catalog is empty")]
    Empty,

    #[error("Prompt #{0} has no prompt text")]
    BlankPrompt(u32),
}

/// Ordered, read-only list of prompts for one run
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    records: Vec<PromptRecord>,
}

impl PromptCatalog {
    pub fn new(records: Vec<PromptRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(blank) = records.iter().find(|r| r.prompt.trim().is_empty()) {
            return Err(CatalogError::BlankPrompt(blank.sequence_number));
        }
        Ok(Self { records })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path` when given, else the bundled catalog
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Keep only the first `n` records
    pub fn truncated(mut self, n: usize) -> Self {
        self.records.truncate(n);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptRecord> {
        self.records.iter()
    }
}
