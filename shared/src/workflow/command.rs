//! Workflow commands and responses
//!
//! Every mutation of workflow state enters the engine as a
//! [`WorkflowCommand`]: a unique command id (the idempotency key), the
//! verified actor, and a typed payload. The engine answers with a
//! [`CommandResponse`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::data_request::FileRef;
use super::role::Actor;
use super::status::OrderStatus;
use crate::error::CommandError;

/// A request from an actor to mutate workflow state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCommand {
    /// Unique command id, used for idempotent replay detection
    pub command_id: String,
    /// Verified actor issuing the command
    pub actor: Actor,
    /// Unix millis at submission
    pub timestamp: i64,
    /// Optional optimistic concurrency assertion against the target
    /// order's current version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
    /// What to do
    pub payload: WorkflowCommandPayload,
}

impl WorkflowCommand {
    pub fn new(actor: Actor, payload: WorkflowCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor,
            timestamp: chrono::Utc::now().timestamp_millis(),
            expected_version: None,
            payload,
        }
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Typed command payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowCommandPayload {
    /// Client creates a new order
    CreateOrder { total_price: Decimal },
    /// Supervisor claims an unclaimed order (or admin assigns one)
    AssignSupervisor {
        order_id: String,
        supervisor_id: String,
    },
    /// Owning supervisor picks the field delegate
    AssignDelegate {
        order_id: String,
        delegate_id: String,
    },
    /// Move an order to a new lifecycle status
    TransitionStatus {
        order_id: String,
        target: OrderStatus,
    },
    /// Supervisor asks the client for more data
    CreateDataRequest { order_id: String, message: String },
    /// Client answers an open data request
    RespondDataRequest {
        request_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        client_note: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        uploaded_files: Vec<FileRef>,
    },
    /// Supervisor closes a data request
    CloseDataRequest {
        request_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        supervisor_reply: Option<String>,
    },
    /// Client asks to cancel their order
    RequestCancellation {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Supervisor or admin approves or rejects a pending cancellation
    ResolveCancellation {
        order_id: String,
        approve: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        rejection_reason: Option<String>,
    },
    /// Delegate reports completion to the owning supervisor
    NotifyCompletion {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Recipient acknowledges a notification
    MarkNotificationRead { notification_id: String },
}

impl WorkflowCommandPayload {
    /// Target order id, when the payload addresses an existing order
    ///
    /// `CreateOrder` has no target yet; the data-request and
    /// notification payloads address their own entities.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::AssignSupervisor { order_id, .. }
            | Self::AssignDelegate { order_id, .. }
            | Self::TransitionStatus { order_id, .. }
            | Self::CreateDataRequest { order_id, .. }
            | Self::RequestCancellation { order_id, .. }
            | Self::ResolveCancellation { order_id, .. }
            | Self::NotifyCompletion { order_id, .. } => Some(order_id),
            Self::CreateOrder { .. }
            | Self::RespondDataRequest { .. }
            | Self::CloseDataRequest { .. }
            | Self::MarkNotificationRead { .. } => None,
        }
    }
}

/// Result of command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Echo of the command id
    pub command_id: String,
    /// Whether the command took effect (or had already taken effect)
    pub success: bool,
    /// Order the command acted on, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Rejection detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: impl Into<String>, order_id: Option<String>) -> Self {
        Self {
            command_id: command_id.into(),
            success: true,
            order_id,
            error: None,
        }
    }

    /// Replay of an already-processed command id; reported as success
    /// without re-executing
    pub fn duplicate(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            success: true,
            order_id: None,
            error: None,
        }
    }

    pub fn error(command_id: impl Into<String>, error: CommandError) -> Self {
        Self {
            command_id: command_id.into(),
            success: false,
            order_id: None,
            error: Some(error),
        }
    }
}
