//! # API Error Types
//!
//! The single error type handlers return, plus its mapping to HTTP.
//!
//! ## Status Mapping
//! ```text
//! VALIDATION_ERROR    → 400   malformed or rejected input
//! UNAUTHORIZED        → 401   missing/invalid bearer token
//! FORBIDDEN           → 403   valid token, insufficient rights
//! NOT_FOUND           → 404   unknown product or category
//! CONFLICT            → 409   duplicate sku / category name
//! INSUFFICIENT_STOCK  → 422   requested more than on-hand
//! DATABASE_ERROR      → 500   store failure (details logged, not leaked)
//! INTERNAL            → 500   anything else
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use stockpos_core::{CoreError, ValidationError};
use stockpos_db::{DbError, LedgerError};

/// Machine-readable error category carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InsufficientStock,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InsufficientStock => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body: `{"code": "...", "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Missing or invalid token")
    }

    pub fn forbidden() -> Self {
        ApiError::new(ErrorCode::Forbidden, "Insufficient rights")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) | CoreError::CategoryNotFound(_) => {
                ApiError::new(ErrorCode::NotFound, err.to_string())
            }
            CoreError::DuplicateSku(_) | CoreError::DuplicateCategory(_) => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(inner) => inner.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Store details go to the log, never to the client.
        error!(error = %err, "Database error while handling request");
        ApiError::new(ErrorCode::DatabaseError, "Internal server error")
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Core(core) => core.into(),
            LedgerError::Db(db) => db.into(),
        }
    }
}

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
