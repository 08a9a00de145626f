//! Shared types for the educational-service order broker
//!
//! Common types used across crates: the order/status vocabulary,
//! actor roles, command and response structures, and the unified
//! error code system.

pub mod error;
pub mod workflow;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{CommandError, ErrorCategory, ErrorCode};
pub use workflow::{
    Actor, CommandResponse, OrderRecord, OrderStatus, Role, WorkflowCommand,
    WorkflowCommandPayload,
};
