//! Error types for tasktogo
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown record)
//! - 3: Refused (entity validation failed, malformed snapshot)
//! - 4: Operation failed (storage write, serialization failure)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tasktogo CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REFUSED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasktogo operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Priority not found: {0}")]
    PriorityNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Data directory could not be resolved")]
    NoDataDir,

    // Refusals (exit code 3)
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Storage write failed: {0}")]
    StorageWrite(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TaskNotFound(_)
            | Error::CategoryNotFound(_)
            | Error::PriorityNotFound(_)
            | Error::ImageNotFound(_)
            | Error::NoDataDir => exit_codes::USER_ERROR,

            // Refusals
            Error::Validation { .. } | Error::InvalidSnapshot(_) => exit_codes::REFUSED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::StorageWrite(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Build a validation error from a list of rule violations
    pub fn validation(errors: Vec<String>) -> Self {
        Error::Validation { errors }
    }

    /// Structured details for JSON error output, when the variant carries any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { errors } => Some(serde_json::json!({ "errors": errors })),
            _ => None,
        }
    }
}

/// Result type alias for tasktogo operations
pub type Result<T> = std::result::Result<T, Error>;
