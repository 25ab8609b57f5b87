use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sheetapi_core::SheetApiError;
use sheetapi_store::StoreError;
use thiserror::Error;
use tracing::{error, warn};

/// The route an error came from; picks the generic message a 500 carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    FetchSheet,
    List,
    GetOne,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Connect => "Failed to retrieve spreadsheet metadata",
            Operation::FetchSheet => "Failed to fetch sheet data",
            Operation::List => "Failed to fetch records",
            Operation::GetOne => "Failed to fetch single record",
            Operation::Create => "Failed to create record",
            Operation::Update => "Failed to update record",
            Operation::Delete => "Failed to delete record",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation:?} failed: {source}")]
    Operation {
        operation: Operation,
        #[source]
        source: SheetApiError,
    },

    #[error("collection `{0}` is not registered")]
    CollectionNotFound(String),

    #[error("bad request body: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// `map_err` adapter tagging a core error with its route.
    pub fn during(operation: Operation) -> impl FnOnce(SheetApiError) -> ApiError {
        move |source| ApiError::Operation { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CollectionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Operation { operation, source } => match source {
                SheetApiError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
                SheetApiError::Store(StoreError::SpreadsheetNotFound(_))
                    if *operation == Operation::Connect =>
                {
                    StatusCode::NOT_FOUND
                }
                SheetApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                SheetApiError::AlreadyRegistered(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::CollectionNotFound(_) => json!({ "error": "Collection not found" }),
            ApiError::BadRequest(detail) => json!({ "error": detail }),
            ApiError::Operation { operation, source } => match status {
                StatusCode::NOT_FOUND if *operation == Operation::Connect => {
                    json!({ "msg": "Spreadsheet not found" })
                }
                StatusCode::NOT_FOUND => json!({ "error": "Record not found" }),
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                    json!({ "error": source.to_string() })
                }
                _ => json!({ "error": operation.failure_message() }),
            },
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetapi_core::{GridError, PayloadError};

    fn status_of(operation: Operation, source: SheetApiError) -> StatusCode {
        ApiError::during(operation)(source).status()
    }

    #[test]
    fn maps_core_errors_to_statuses() {
        assert_eq!(
            status_of(Operation::GetOne, SheetApiError::record_not_found("name", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                Operation::Connect,
                SheetApiError::Store(StoreError::SpreadsheetNotFound("x".into()))
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                Operation::FetchSheet,
                SheetApiError::Store(StoreError::SpreadsheetNotFound("x".into()))
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(
                Operation::Create,
                PayloadError::UnknownField("x".into()).into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Operation::Connect, SheetApiError::AlreadyRegistered("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(Operation::List, GridError::BlankHeader.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(Operation::Connect, SheetApiError::InvalidLocator("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
