//! Workflow domain types
//!
//! This module provides the vocabulary of the order lifecycle engine:
//! - Commands: requests from actors to mutate workflow state
//! - Records: durable order / data-request / notification state
//! - Status: the canonical state enumeration plus the legacy Arabic
//!   phrase adapter

pub mod command;
pub mod data_request;
pub mod notification;
pub mod order;
pub mod role;
pub mod status;

// Re-exports
pub use command::{CommandResponse, WorkflowCommand, WorkflowCommandPayload};
pub use data_request::{DataRequest, DataRequestStatus, FileRef};
pub use notification::{Notification, NotificationKind, NotificationStatus, ADMIN_RECIPIENT};
pub use order::{CancellationDecision, CancellationOutcome, CancellationRequest, OrderRecord};
pub use role::{Actor, Role};
pub use status::OrderStatus;
