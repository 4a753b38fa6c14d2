use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use super::{SheetsError, ValueInputOption, Workbook, WorksheetHandle};
use crate::auth::TokenProvider;

/// Default Sheets API host
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

const METADATA_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
}

impl From<SheetProperties> for WorksheetHandle {
    fn from(properties: SheetProperties) -> Self {
        WorksheetHandle {
            sheet_id: properties.sheet_id,
            title: properties.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchUpdateReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateReply {
    #[serde(default)]
    add_sheet: Option<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

/// Sheets v4 REST client bound to one spreadsheet
pub struct GoogleSheetsClient {
    spreadsheet_id: String,
    base_url: String,
    http_client: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
}

impl GoogleSheetsClient {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        auth: Arc<dyn TokenProvider>,
    ) -> Result<Self, SheetsError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            spreadsheet_id: spreadsheet_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client,
            auth,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Open the spreadsheet, failing if it does not exist or is not shared
    /// with the service account.
    pub async fn open(self) -> Result<Self, SheetsError> {
        let metadata = self.metadata().await?;
        tracing::info!(
            spreadsheet_id = %metadata.spreadsheet_id,
            worksheets = metadata.sheets.len(),
            "Opened spreadsheet {}",
            metadata
                .properties
                .as_ref()
                .and_then(|p| p.title.as_deref())
                .unwrap_or("<untitled>")
        );
        Ok(self)
    }

    pub async fn metadata(&self) -> Result<SpreadsheetMetadata, SheetsError> {
        let request = self
            .http_client
            .get(self.spreadsheet_url())
            .query(&[("fields", METADATA_FIELDS)]);
        self.send(request).await
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, title: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(&quote_title(title))
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SheetsError> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| SheetsError::UnexpectedResponse(e.to_string()))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<GoogleErrorResponse>(&error_text)
                .map(|error_response| error_response.error.message)
                .unwrap_or(error_text);

            Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Quote a worksheet title for use as an A1 range
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[async_trait]
impl Workbook for GoogleSheetsClient {
    async fn worksheet(&self, title: &str) -> Result<WorksheetHandle, SheetsError> {
        self.metadata()
            .await?
            .sheets
            .into_iter()
            .map(|entry| entry.properties)
            .find(|properties| properties.title == title)
            .map(WorksheetHandle::from)
            .ok_or_else(|| SheetsError::WorksheetNotFound(title.to_string()))
    }

    async fn row_count(&self, sheet: &WorksheetHandle) -> Result<usize, SheetsError> {
        let request = self.http_client.get(self.values_url(&sheet.title));
        let range: ValueRange = self.send(request).await?;
        Ok(range.values.len())
    }

    async fn add_worksheet(
        &self,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<WorksheetHandle, SheetsError> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {"rowCount": rows, "columnCount": cols}
                    }
                }
            }]
        });
        let request = self
            .http_client
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .json(&body);

        let response: BatchUpdateResponse = match self.send(request).await {
            Err(SheetsError::Api { status: 400, message }) if message.contains("already exists") => {
                return Err(SheetsError::WorksheetExists(title.to_string()))
            }
            other => other?,
        };
        response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
            .map(|entry| WorksheetHandle::from(entry.properties))
            .ok_or_else(|| {
                SheetsError::UnexpectedResponse(format!("addSheet reply missing for {}", title))
            })
    }

    async fn append_row(
        &self,
        sheet: &WorksheetHandle,
        values: &[String],
        option: ValueInputOption,
    ) -> Result<(), SheetsError> {
        let request = self
            .http_client
            .post(format!("{}:append", self.values_url(&sheet.title)))
            .query(&[("valueInputOption", option.as_str())])
            .json(&json!({"majorDimension": "ROWS", "values": [values]}));

        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    #[test]
    fn test_quote_title() {
        assert_eq!(quote_title("Answers_2025_03"), "'Answers_2025_03'");
        assert_eq!(quote_title("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_values_url_is_encoded() {
        let client = GoogleSheetsClient::new("sheet-123", Arc::new(StaticToken::new("t")))
            .unwrap()
            .with_base_url("http://localhost:1234/");
        assert_eq!(
            client.values_url("Answers_2025_03"),
            "http://localhost:1234/v4/spreadsheets/sheet-123/values/%27Answers_2025_03%27"
        );
    }

    #[test]
    fn test_metadata_deserializes() {
        let metadata: SpreadsheetMetadata = serde_json::from_value(json!({
            "spreadsheetId": "abc",
            "properties": {"title": "Car answers"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0,
                    "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
                {"properties": {"sheetId": 77, "title": "Answers_2025_03"}}
            ]
        }))
        .unwrap();

        assert_eq!(metadata.sheets.len(), 2);
        let handle = WorksheetHandle::from(metadata.sheets.into_iter().nth(1).unwrap().properties);
        assert_eq!(handle.sheet_id, 77);
        assert_eq!(handle.title, "Answers_2025_03");
    }
}
