//! Durable order record
//!
//! The order row is the only shared mutable resource in the core. All
//! mutations go through the workflow manager's single write
//! transaction; the `version` field is the optimistic concurrency
//! token callers may assert with `expected_version`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// Client-initiated cancellation request, pending resolution
///
/// First-class entity on the order (not a free-form metadata bag).
/// At most one may be outstanding per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRequest {
    /// Client who requested cancellation
    pub requested_by: String,
    /// Unix millis
    pub requested_at: i64,
    /// Rollback target, fixed at request time and restored verbatim on
    /// rejection
    pub previous_status: OrderStatus,
    /// Optional human-readable reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of a resolved cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationOutcome {
    Approved,
    Rejected,
}

/// Recorded decision metadata for the most recent resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationDecision {
    pub outcome: CancellationOutcome,
    pub decided_by: String,
    /// Unix millis
    pub decided_at: i64,
    /// Required on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Order record
///
/// Invariants held after every operation:
/// - `assigned_delegate_id` is non-null only if `assigned_supervisor_id`
///   is non-null
/// - once `status` is terminal, no further transition is accepted
/// - orders are never hard-deleted; cancellation is a terminal status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Opaque unique id (uuid)
    pub order_id: String,
    /// Human-readable order number, crash-safe counter based
    pub reference: String,
    /// Owner; set at creation, immutable
    pub client_id: String,
    /// Settable exactly once per non-null transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_supervisor_id: Option<String>,
    /// Settable exactly once; requires a supervisor first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_delegate_id: Option<String>,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Non-negative
    pub total_price: Decimal,
    /// Optimistic concurrency token, bumped on every persisted change
    #[serde(default)]
    pub version: u64,

    // === Assignment / completion stamps ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_assigned_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,

    // === Cancellation sub-workflow ===
    /// Pending request, if any (single outstanding slot)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationRequest>,
    /// Most recent resolution, kept for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_decision: Option<CancellationDecision>,

    /// Unix millis
    pub created_at: i64,
    /// Unix millis, stamped on every successful mutation
    pub updated_at: i64,
}

impl OrderRecord {
    /// Create a new order in the initial state
    pub fn new(
        order_id: impl Into<String>,
        reference: impl Into<String>,
        client_id: impl Into<String>,
        total_price: Decimal,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            order_id: order_id.into(),
            reference: reference.into(),
            client_id: client_id.into(),
            assigned_supervisor_id: None,
            assigned_delegate_id: None,
            status: OrderStatus::New,
            total_price,
            version: 0,
            assigned_at: None,
            delegate_assigned_at: None,
            completed_by: None,
            completed_at: None,
            cancellation: None,
            cancellation_decision: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this order accepts any further mutation
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether a cancellation request is outstanding
    pub fn has_pending_cancellation(&self) -> bool {
        self.cancellation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_new_order_defaults() {
        let order = OrderRecord::new("ord-1", "ORD2026010110001", "client-1", Decimal::new(2500, 2));
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.version, 0);
        assert!(order.assigned_supervisor_id.is_none());
        assert!(order.assigned_delegate_id.is_none());
        assert!(!order.is_closed());
        assert!(!order.has_pending_cancellation());
    }

    #[test]
    fn test_serde_roundtrip_with_cancellation() {
        let mut order = OrderRecord::new("ord-1", "ORD2026010110001", "client-1", Decimal::ZERO);
        order.cancellation = Some(CancellationRequest {
            requested_by: "client-1".into(),
            requested_at: 1,
            previous_status: OrderStatus::InProgress,
            reason: Some("moved abroad".into()),
        });

        let json = serde_json::to_string(&order).unwrap();
        let back: OrderRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
        assert_eq!(
            back.cancellation.unwrap().previous_status,
            OrderStatus::InProgress
        );
    }
}
