//! Unified error system for the order broker
//!
//! This module provides:
//! - [`ErrorCode`]: standardized error codes for every rejection the
//!   workflow engine can produce
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`CommandError`]: the stable error surface returned to callers
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission / ownership errors
//! - 4xxx: Workflow errors (orders, data requests, cancellation,
//!   notifications)
//! - 9xxx: System errors

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::CommandError;
