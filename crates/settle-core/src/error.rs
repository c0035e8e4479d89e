//! Error handling for the settle core crate
//!
//! The allocator and the graph merge are total over their input domains; the
//! errors here come from the edges around them: checked allocation input,
//! configuration, and documents crossing the JSON boundary.

use settle_calculator::AllocationError;
use thiserror::Error;

/// Error type for settle core operations
#[derive(Error, Debug, Clone)]
pub enum SettleError {
    /// Rejected allocation input
    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// Configuration loading and parsing errors
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// Serialization and deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String, data_type: Option<String> },

    /// File system errors
    #[error("I/O error: {message}")]
    Io { message: String, path: Option<String> },
}

impl SettleError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SettleError::Allocation(_) => "allocation",
            SettleError::Configuration { .. } => "configuration",
            SettleError::Serialization { .. } => "serialization",
            SettleError::Io { .. } => "io",
        }
    }

    /// Whether retrying with corrected input can succeed without a restart
    pub fn is_recoverable(&self) -> bool {
        match self {
            SettleError::Allocation(_) => true,
            SettleError::Configuration { .. } => false, // Config errors need fixing
            SettleError::Serialization { .. } => true,
            SettleError::Io { .. } => true,
        }
    }

    /// Create a configuration error for a specific setting
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into(), setting: Some(setting.to_string()) }
    }

    /// Create a serialization error
    pub fn serialization(data_type: &str, message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), data_type: Some(data_type.to_string()) }
    }

    /// Create an I/O error for a path
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::Io { message: err.to_string(), path: Some(path.as_ref().display().to_string()) }
    }
}

/// Result type alias for core operations
pub type SettleResult<T> = Result<T, SettleError>;
