//! Stable error surface returned to callers

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error attached to a rejected command response
///
/// Every rejected operation carries a stable [`ErrorCode`] plus a
/// human-readable reason; no operation silently no-ops.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct CommandError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl CommandError {
    /// Create a new error with a custom message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new error with the default message for the error code
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }
}
