//! Parameter validation helpers
//!
//! Shared by both services so that every operation rejects bad input with
//! `AppError::InvalidParameter` before it touches storage.

use crate::error::AppError;
use crate::AppResult;
use validator::Validate;

/// Unwrap a parameter object that the caller may have omitted
pub fn require<T>(params: Option<T>, what: &str) -> AppResult<T> {
    params.ok_or_else(|| AppError::invalid(format!("{} must be provided", what)))
}

/// Unwrap a parameter object and run its declarative validation rules
pub fn require_valid<T: Validate>(params: Option<T>, what: &str) -> AppResult<T> {
    let params = require(params, what)?;
    params.validate()?;
    Ok(params)
}

/// Trimmed, non-empty text value
pub fn require_text(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::invalid(format!("{} must not be empty", field))),
    }
}

/// Positive storage identifier
pub fn require_id(id: i32, what: &str) -> AppResult<i32> {
    if id <= 0 {
        return Err(AppError::invalid(format!(
            "{} id must be positive, got {}",
            what, id
        )));
    }
    Ok(id)
}
