use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure taxonomy for one conversion run.
///
/// Every variant is terminal to the current run and is reported inline to the
/// user; nothing is logged-and-retried behind their back. Per-row geocoding
/// misses are deliberately *not* part of this enum — a miss records empty
/// coordinates for that row and the batch continues.
#[derive(Debug, Error)]
pub enum AppError {
    /// The uploaded bytes are not a parseable spreadsheet.
    #[error("failed to read spreadsheet: {0}")]
    Load(String),

    /// Convert was triggered with no address columns selected.
    #[error("Please select at least one column for the address.")]
    EmptySelection,

    /// A selected column name does not exist in the uploaded table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// An operation that needs an uploaded table arrived before any upload.
    #[error("no spreadsheet uploaded yet")]
    NoTable,

    /// Download was requested before a conversion finished.
    #[error("no converted spreadsheet available for download")]
    NotReady,

    /// The result table could not be serialized back to xlsx.
    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// Anything else that escapes the stages above.
    #[error("error processing file: {0}")]
    Unhandled(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptySelection | AppError::UnknownColumn(_) => StatusCode::BAD_REQUEST,
            AppError::NoTable | AppError::NotReady => StatusCode::CONFLICT,
            AppError::Export(_) | AppError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        assert_eq!(AppError::EmptySelection.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UnknownColumn("Zip".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn load_error_maps_to_unprocessable_entity() {
        assert_eq!(
            AppError::Load("bad zip".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn state_errors_map_to_conflict() {
        assert_eq!(AppError::NoTable.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotReady.status(), StatusCode::CONFLICT);
    }
}
