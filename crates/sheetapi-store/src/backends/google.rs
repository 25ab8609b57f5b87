use crate::error::StoreError;
use crate::traits::{AppendAck, ClearAck, Rows, SheetStore, SpreadsheetMetadata, UpdateAck};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use sheetapi_common::{A1Range, CellValue};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/";

/// Writes are stored exactly as sent; no formula or date parsing on the store side.
const VALUE_INPUT_OPTION: &str = "RAW";
const METADATA_FIELDS: &str = "spreadsheetId,sheets.properties";

#[derive(Clone, Debug)]
pub struct GoogleSheetsConfig {
    /// OAuth2 bearer token with the `spreadsheets` scope. Obtaining it is the caller's job.
    pub access_token: String,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl GoogleSheetsConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Rows,
}

/// Google Sheets v4 REST backend.
///
/// Each trait call is exactly one HTTP request. A non-success status is reported as
/// [`StoreError::Rejected`] with the response body, except a 404 from the metadata call,
/// which becomes [`StoreError::SpreadsheetNotFound`].
pub struct GoogleSheetsStore {
    client: Client,
    base: Url,
    access_token: String,
}

impl GoogleSheetsStore {
    pub fn new(config: GoogleSheetsConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| StoreError::Config(format!("invalid API base `{}`: {e}", config.api_base)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "API base `{}` cannot carry path segments",
                config.api_base
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base,
            access_token: config.access_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn values_endpoint(&self, spreadsheet_id: &str, range: &str) -> Url {
        self.endpoint(&["spreadsheets", spreadsheet_id, "values", range])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl SheetStore for GoogleSheetsStore {
    async fn fetch_range(&self, spreadsheet_id: &str, range: &A1Range) -> Result<Rows, StoreError> {
        let url = self.values_endpoint(spreadsheet_id, &range.to_string());
        #[cfg(feature = "tracing")]
        tracing::debug!(spreadsheet_id, %range, "values.get");
        let body: ValueRange = self.send(self.client.get(url)).await?;
        Ok(body.values)
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<AppendAck, StoreError> {
        let url = self.values_endpoint(spreadsheet_id, &format!("{range}:append"));
        #[cfg(feature = "tracing")]
        tracing::debug!(spreadsheet_id, %range, cells = values.len(), "values.append");
        let request = self
            .client
            .post(url)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&json!({ "values": [values] }));
        self.send(request).await
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<UpdateAck, StoreError> {
        let rendered = range.to_string();
        let url = self.values_endpoint(spreadsheet_id, &rendered);
        #[cfg(feature = "tracing")]
        tracing::debug!(spreadsheet_id, range = %rendered, cells = values.len(), "values.update");
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&json!({
                "range": rendered,
                "majorDimension": "ROWS",
                "values": [values],
            }));
        self.send(request).await
    }

    async fn clear_ranges(
        &self,
        spreadsheet_id: &str,
        ranges: &[A1Range],
    ) -> Result<ClearAck, StoreError> {
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values:batchClear"]);
        let ranges: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        #[cfg(feature = "tracing")]
        tracing::debug!(spreadsheet_id, ?ranges, "values.batchClear");
        let request = self.client.post(url).json(&json!({ "ranges": ranges }));
        self.send(request).await
    }

    async fn fetch_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata, StoreError> {
        let url = self.endpoint(&["spreadsheets", spreadsheet_id]);
        #[cfg(feature = "tracing")]
        tracing::debug!(spreadsheet_id, "spreadsheets.get");
        let request = self.client.get(url).query(&[("fields", METADATA_FIELDS)]);
        self.send(request)
            .await
            .map_err(missing_spreadsheet(spreadsheet_id))
    }
}

/// A values call can 404 on a range the API cannot resolve, so only the metadata lookup
/// treats 404 as a missing spreadsheet.
fn missing_spreadsheet(spreadsheet_id: &str) -> impl FnOnce(StoreError) -> StoreError + '_ {
    move |err| match err {
        StoreError::Rejected { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            StoreError::SpreadsheetNotFound(spreadsheet_id.to_string())
        }
        other => other,
    }
}
