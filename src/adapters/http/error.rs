//! HTTP error mapping shared by all endpoint areas.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::PortalError;

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
        }
    }
}

/// Map the error taxonomy onto HTTP status codes.
pub fn error_response(error: PortalError) -> Response {
    let status = match &error {
        PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
        PortalError::Validation { .. } => StatusCode::BAD_REQUEST,
        PortalError::Conflict { .. } => StatusCode::CONFLICT,
        PortalError::Derivation { .. } => StatusCode::BAD_GATEWAY,
        PortalError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorResponse {
        code: error.code().to_string(),
        message: error.to_string(),
    };
    (status, Json(body)).into_response()
}
