//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gvw_common::GvwError;
use serde_json::json;
use thiserror::Error;

/// Result type alias for handler operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Every variant renders as a JSON body with an explicit `status` field;
/// clients never see a bare HTTP error.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Normalization error: {0}")]
    Ingest(#[from] gvw_ingest::IngestError),

    #[error("Warehouse error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Gvw(#[from] GvwError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error. Missing objects are the caller's problem
    /// (404); bad payloads are 400; everything else is internal.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Gvw(GvwError::ObjectNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {:?}", self);
        }

        // BadRequest bodies carry the bare message, matching the trigger's
        // own validation responses.
        let message = match &self {
            AppError::BadRequest(message) => message.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_400() {
        let response = AppError::BadRequest("missing bucket or name".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ingest_error_maps_to_500() {
        let err = AppError::Ingest(gvw_ingest::IngestError::Config("no id column".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_object_maps_to_404() {
        let err = AppError::Gvw(GvwError::ObjectNotFound("s3://bucket/key".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transport_maps_to_500() {
        let err = AppError::Gvw(GvwError::Transport("connection reset".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
