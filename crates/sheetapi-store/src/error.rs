use sheetapi_common::A1ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("spreadsheet `{0}` not found")]
    SpreadsheetNotFound(String),

    #[error("sheet `{sheet}` not found in spreadsheet `{spreadsheet_id}`")]
    SheetNotFound {
        spreadsheet_id: String,
        sheet: String,
    },

    /// The store answered, but refused the request.
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid range: {0}")]
    InvalidRange(#[from] A1ParseError),

    #[error("store configuration: {0}")]
    Config(String),

    #[cfg(feature = "google")]
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the spreadsheet itself does not exist (as opposed to a tab or a transient failure).
    pub fn is_spreadsheet_not_found(&self) -> bool {
        matches!(self, StoreError::SpreadsheetNotFound(_))
    }
}
