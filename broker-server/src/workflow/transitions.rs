//! Role-gated status transition rules
//!
//! One table per staff role; clients never move status directly (they
//! act through the cancellation and data-request sub-workflows), and
//! admins may set any status on any open order.

use shared::workflow::{Actor, OrderRecord, OrderStatus, Role};

use super::traits::WorkflowError;

/// Statuses the owning supervisor may set
pub const SUPERVISOR_TARGETS: [OrderStatus; 4] = [
    OrderStatus::InProgress,
    OrderStatus::WaitingAttachments,
    OrderStatus::WaitingClient,
    OrderStatus::Completed,
];

/// Statuses the assigned delegate may set
pub const DELEGATE_TARGETS: [OrderStatus; 1] = [OrderStatus::Completed];

/// Validate a direct status transition on an order
///
/// Terminal orders reject everything; role gates apply afterwards.
/// Assignment and cancellation statuses are reachable only through
/// their dedicated operations (or an admin override).
pub fn check_transition(
    order: &OrderRecord,
    actor: &Actor,
    target: OrderStatus,
) -> Result<(), WorkflowError> {
    if order.is_closed() {
        return Err(WorkflowError::OrderClosed(format!(
            "order {} is {}",
            order.order_id, order.status
        )));
    }

    match actor.role {
        Role::Admin => Ok(()),
        Role::Supervisor => {
            if order.assigned_supervisor_id.as_deref() != Some(actor.id.as_str()) {
                return Err(WorkflowError::NotAssignedToYou(order.order_id.clone()));
            }
            if !SUPERVISOR_TARGETS.contains(&target) {
                return Err(WorkflowError::ForbiddenTransition(format!(
                    "supervisor cannot set status {}",
                    target
                )));
            }
            Ok(())
        }
        Role::Delegate => {
            if order.assigned_delegate_id.as_deref() != Some(actor.id.as_str()) {
                return Err(WorkflowError::NotAssignedToYou(order.order_id.clone()));
            }
            if !DELEGATE_TARGETS.contains(&target) {
                return Err(WorkflowError::ForbiddenTransition(format!(
                    "delegate cannot set status {}",
                    target
                )));
            }
            Ok(())
        }
        Role::Client => Err(WorkflowError::Forbidden(
            "clients cannot change order status directly".to_string(),
        )),
    }
}
