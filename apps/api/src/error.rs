//! Error types for the HTTP API.
//!
//! Every failure leaves the server as JSON:
//! `{"code": "INVALID_REQUEST", "message": "...", "field": "products[0].quantity"}`.
//! `field` is present only for validation errors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use biashara_core::ValidationError;
use biashara_db::{DbError, SettlementError};

/// An error response.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Machine-readable kind
    pub code: &'static str,

    pub message: String,

    /// The request field at fault, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Storage failure; the details are logged, not returned.
    pub fn storage(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Storage failure");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_ERROR",
            "An internal storage error occurred",
        )
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        ApiError::invalid_request(err.to_string()).with_field(field)
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        let code = err.code();
        match err {
            SettlementError::InvalidRequest(validation) => validation.into(),
            SettlementError::NotFound { .. } | SettlementError::InsufficientStock { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, code, err.to_string())
            }
            SettlementError::Storage(db_err) => ApiError::storage(db_err),
            SettlementError::Timeout(_) => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, code, err.to_string())
            }
            SettlementError::Cancelled => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            other => ApiError::storage(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}
