//! Unified error handling for the car rental engine
//!
//! Every service operation returns `AppResult<T>`. Callers that only care about
//! the broad category of a failure match on [`AppError::kind`]; the HTTP layer
//! relies on the `ResponseError` implementation below.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Input Errors ====================
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ==================== Lookup Errors ====================
    #[error("Client account not found: {0}")]
    ClientNotFound(i32),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(i32),

    // ==================== Lifecycle Errors ====================
    #[error("State conflict: {0}")]
    StateConflict(String),

    // ==================== Catalog / Configuration Errors ====================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ==================== Infrastructure Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Broad error classification shared by all service operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, missing, or out-of-range input
    InvalidParameter,
    /// Referenced identifier does not exist
    NotFound,
    /// Operation not valid for the current lifecycle state
    StateConflict,
    /// Catalog or configuration data is inconsistent
    Configuration,
    /// Storage or runtime failure
    Infrastructure,
}

impl AppError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            AppError::ClientNotFound(_) | AppError::ReservationNotFound(_) => ErrorKind::NotFound,
            AppError::StateConflict(_) => ErrorKind::StateConflict,
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Internal(_)
            | AppError::Serialization(_) => ErrorKind::Infrastructure,
        }
    }

    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidParameter(message.into())
    }

    /// Shorthand for a `StateConflict` error
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::StateConflict(message.into())
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StateConflict => StatusCode::CONFLICT,
            ErrorKind::Configuration | ErrorKind::Infrastructure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidParameter(_) => "invalid_parameter",
            AppError::ClientNotFound(_) => "client_not_found",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::StateConflict(_) => "state_conflict",
            AppError::Configuration(_) => "configuration_error",
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Internal(_) => "internal_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidParameter(err.to_string())
    }
}
