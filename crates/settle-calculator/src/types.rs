use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocation::AllocationError;

/// Structured failure of a calculator plugin
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Calculator error: {message}")]
pub struct CalculatorError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    MissingRequiredField,
    InvalidFieldType,
    InvalidFieldValue,
    NotFound,
}

impl CalculatorError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(ErrorCode::MissingRequiredField, format!("required argument '{field}' not provided"))
    }

    pub fn invalid_type(field: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFieldType,
            format!("argument '{field}' must be {expected}, got {actual}"),
        )
    }

    pub fn invalid_value(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, format!("argument '{field}' is invalid: {reason}"))
    }
}

impl From<AllocationError> for CalculatorError {
    fn from(err: AllocationError) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, err.to_string())
    }
}
