/// Error types for Posting Service
///
/// Every failure surfaces to the caller with a stable kind and a message.
/// Errors are converted to JSON HTTP responses for API clients.
use crate::repository::StoreError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for posting-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input; nothing was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// Blob store or database operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Label detector failed or timed out
    #[error("Detection error: {0}")]
    Detection(String),

    /// Uniqueness violation on an edge insert
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Referenced post or user absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database could not be reached (pool timeout, connection loss)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Detection(_) => "DETECTION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Detection(_) => StatusCode::BAD_GATEWAY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::TransactionAborted(msg) => {
                AppError::StoreUnavailable(msg)
            }
            StoreError::UniqueViolation(msg) => AppError::Conflict(msg),
            StoreError::ForeignKeyViolation(msg) => AppError::NotFound(msg),
            StoreError::Query(msg) => AppError::Storage(msg),
        }
    }
}
