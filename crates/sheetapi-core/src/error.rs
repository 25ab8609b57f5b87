use sheetapi_store::StoreError;
use thiserror::Error;

/// Shape violations in a fetched grid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no header row")]
    MissingHeader,
    #[error("header row has no cells")]
    BlankHeader,
}

/// Problems with a caller-supplied row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("field `{0}` is not a column of this sheet")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum SheetApiError {
    #[error("malformed grid: {0}")]
    MalformedGrid(#[from] GridError),

    #[error("no record where `{field}` is `{value}`")]
    RecordNotFound { field: String, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("`{0}` does not contain a spreadsheet id")]
    InvalidLocator(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error("collection `{0}` is already registered")]
    AlreadyRegistered(String),
}

impl SheetApiError {
    pub fn record_not_found(field: &str, value: &str) -> Self {
        SheetApiError::RecordNotFound {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SheetApiError::RecordNotFound { .. })
    }
}
