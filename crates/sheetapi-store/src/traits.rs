use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use sheetapi_common::{A1Range, CellValue};
use std::future::Future;

/// Raw rows exactly as a store returns them: trailing empty cells and rows trimmed.
pub type Rows = Vec<Vec<CellValue>>;

/// Spreadsheet-level metadata: the stable id plus its tabs in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl SpreadsheetMetadata {
    /// Tab titles in display order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.properties.title.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: u32,
}

/// Acknowledgement of an overwrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

/// Acknowledgement of an append. `updates` describes where the row actually landed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendAck {
    pub spreadsheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: UpdateAck,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearAck {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub cleared_ranges: Vec<String>,
}

/// Boundary to a remote (or in-process) spreadsheet.
///
/// Implementations are assumed authenticated and reachable; every call is a single round
/// trip with no retries. Row and column numbers inside ranges are 1-based.
pub trait SheetStore: Send + Sync + 'static {
    /// Read a range. A whole-sheet range returns every row, header included.
    fn fetch_range(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
    ) -> impl Future<Output = Result<Rows, StoreError>> + Send;

    /// Append one row after the last non-empty row of `range`'s sheet.
    fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> impl Future<Output = Result<AppendAck, StoreError>> + Send;

    /// Overwrite cells starting at the top-left corner of `range`.
    fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> impl Future<Output = Result<UpdateAck, StoreError>> + Send;

    /// Blank every cell inside `ranges`. Rows are never removed.
    fn clear_ranges(
        &self,
        spreadsheet_id: &str,
        ranges: &[A1Range],
    ) -> impl Future<Output = Result<ClearAck, StoreError>> + Send;

    fn fetch_metadata(
        &self,
        spreadsheet_id: &str,
    ) -> impl Future<Output = Result<SpreadsheetMetadata, StoreError>> + Send;
}
