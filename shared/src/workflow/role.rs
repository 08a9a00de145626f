//! Actor roles
//!
//! The identity/auth collaborator supplies a verified `(actor_id, role)`
//! tuple for every operation; the engine trusts it as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed actor roles of the brokerage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Order owner; affects status only through the sub-workflows
    Client,
    /// Responsible for an order's substantive progress
    Supervisor,
    /// Executes on-the-ground task fulfillment
    Delegate,
    /// Escape hatch; may set any state at any time
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Client => "client",
            Role::Supervisor => "supervisor",
            Role::Delegate => "delegate",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Verified actor identity attached to every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Opaque actor id
    pub id: String,
    /// Actor role
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn client(id: impl Into<String>) -> Self {
        Self::new(id, Role::Client)
    }

    pub fn supervisor(id: impl Into<String>) -> Self {
        Self::new(id, Role::Supervisor)
    }

    pub fn delegate(id: impl Into<String>) -> Self {
        Self::new(id, Role::Delegate)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
