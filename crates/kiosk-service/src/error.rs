//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::ExternalService(msg) => {
                (StatusCode::BAD_GATEWAY, "external_service_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<kiosk_ledger::LedgerError> for ApiError {
    fn from(err: kiosk_ledger::LedgerError) -> Self {
        match err {
            kiosk_ledger::LedgerError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            kiosk_ledger::LedgerError::DuplicateTrackId { ref track_id } => {
                // Processor-issued collision; should not happen. Surfaced, never
                // silently retried or overwritten.
                tracing::error!(track_id = %track_id, "Duplicate track id from processor");
                Self::Internal(err.to_string())
            }
            kiosk_ledger::LedgerError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            kiosk_ledger::LedgerError::Database(msg)
            | kiosk_ledger::LedgerError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<crate::orchestrator::CheckoutError> for ApiError {
    fn from(err: crate::orchestrator::CheckoutError) -> Self {
        use crate::orchestrator::CheckoutError;
        match err {
            CheckoutError::PackageUnavailable { package_id } => {
                Self::NotFound(format!("package unavailable: {package_id}"))
            }
            CheckoutError::ProcessorUnavailable | CheckoutError::Gateway(_) => {
                // The user sees a generic retryable message; the underlying
                // gateway error was already logged at the boundary.
                Self::ExternalService(
                    "payment service temporarily unavailable, please try again later".into(),
                )
            }
            CheckoutError::Ledger(e) => e.into(),
        }
    }
}
