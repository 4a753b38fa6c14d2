use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use super::AuthError;
use crate::config::SheetsConfig;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google service account key, as downloaded from the cloud console
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let key: ServiceAccountKey = serde_json::from_str(json)?;
        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(AuthError::InvalidCredentials(format!(
                    "expected a service_account key, got '{}'",
                    kind
                )));
            }
        }
        Ok(key)
    }
}

/// Where the service account key comes from.
///
/// Inline JSON (typically a CI secret) wins over the local key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Inline(String),
    File(PathBuf),
}

impl CredentialSource {
    pub fn from_config(config: &SheetsConfig) -> Self {
        match config.service_account_json.as_deref() {
            Some(json) if !json.trim().is_empty() => CredentialSource::Inline(json.to_string()),
            _ => CredentialSource::File(config.service_account_file.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CredentialSource::Inline(_) => "inline service account JSON".to_string(),
            CredentialSource::File(path) => format!("service account file {}", path.display()),
        }
    }

    pub fn load(&self) -> Result<ServiceAccountKey, AuthError> {
        match self {
            CredentialSource::Inline(json) => ServiceAccountKey::from_json(json),
            CredentialSource::File(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    AuthError::MissingCredentials(format!("{}: {}", path.display(), e))
                })?;
                ServiceAccountKey::from_json(&json)
            }
        }
    }
}
