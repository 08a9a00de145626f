//! Unified error codes for the order broker
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission / ownership errors
//! - 4xxx: Workflow errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Unknown status value (neither canonical nor legacy vocabulary)
    InvalidStatus = 6,

    // ==================== 1xxx: Auth ====================
    /// Missing or invalid actor identity
    Unauthorized = 1001,

    // ==================== 2xxx: Permission ====================
    /// Actor role lacks the right for this action
    Forbidden = 2001,
    /// Supervisor/delegate is not assigned to this order
    NotAssignedToYou = 2002,
    /// Acting party does not own this order
    NotYourOrder = 2003,

    // ==================== 4xxx: Workflow ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is in a terminal state; no further transitions accepted
    OrderClosed = 4002,
    /// Assignment slot is already taken
    AlreadyAssigned = 4003,
    /// State machine rejects the target state for this role
    ForbiddenTransition = 4004,
    /// Delegate is not assigned to this order
    NotAssigned = 4005,
    /// Order has no assigned supervisor
    NoSupervisor = 4006,
    /// Version check failed; the order was modified concurrently
    ConcurrentModification = 4007,

    // ==================== 45xx: Data Request ====================
    /// Data request not found
    RequestNotFound = 4501,
    /// Data request is already closed
    RequestClosed = 4502,

    // ==================== 46xx: Cancellation ====================
    /// Order status does not allow a cancellation request
    NotCancellable = 4601,
    /// No cancellation request is pending on this order
    NoPendingCancellation = 4602,
    /// A cancellation request is already outstanding
    CancellationPending = 4603,

    // ==================== 47xx: Notification ====================
    /// Notification not found
    NotificationNotFound = 4701,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Persistence collaborator failure
    StorageFailure = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidStatus => "Unknown order status value",

            // Auth
            ErrorCode::Unauthorized => "Missing or invalid actor identity",

            // Permission
            ErrorCode::Forbidden => "Actor role lacks the right for this action",
            ErrorCode::NotAssignedToYou => "This order is not assigned to you",
            ErrorCode::NotYourOrder => "This order does not belong to you",

            // Workflow
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderClosed => "Order is closed; no further transitions accepted",
            ErrorCode::AlreadyAssigned => "Order is already assigned",
            ErrorCode::ForbiddenTransition => "Transition target is not allowed for this role",
            ErrorCode::NotAssigned => "You are not the delegate of this order",
            ErrorCode::NoSupervisor => "Order has no assigned supervisor",
            ErrorCode::ConcurrentModification => "Order was modified concurrently",

            // Data request
            ErrorCode::RequestNotFound => "Data request not found",
            ErrorCode::RequestClosed => "Data request is already closed",

            // Cancellation
            ErrorCode::NotCancellable => "Order status does not allow cancellation",
            ErrorCode::NoPendingCancellation => "No cancellation request is pending",
            ErrorCode::CancellationPending => "A cancellation request is already outstanding",

            // Notification
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageFailure => "Storage failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidStatus,
            1001 => ErrorCode::Unauthorized,
            2001 => ErrorCode::Forbidden,
            2002 => ErrorCode::NotAssignedToYou,
            2003 => ErrorCode::NotYourOrder,
            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderClosed,
            4003 => ErrorCode::AlreadyAssigned,
            4004 => ErrorCode::ForbiddenTransition,
            4005 => ErrorCode::NotAssigned,
            4006 => ErrorCode::NoSupervisor,
            4007 => ErrorCode::ConcurrentModification,
            4501 => ErrorCode::RequestNotFound,
            4502 => ErrorCode::RequestClosed,
            4601 => ErrorCode::NotCancellable,
            4602 => ErrorCode::NoPendingCancellation,
            4603 => ErrorCode::CancellationPending,
            4701 => ErrorCode::NotificationNotFound,
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::StorageFailure,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
