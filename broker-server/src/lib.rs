//! Broker Server - order brokering workflow engine
//!
//! Core engine of an educational-services brokerage: clients submit
//! service orders, supervisors claim and steer them, delegates carry
//! out the field work, admins override. The engine owns the order
//! lifecycle state machine, the one-shot assignment protocol, the
//! data-request and cancellation sub-workflows, and staff
//! notifications.
//!
//! # Module structure
//!
//! ```text
//! broker-server/src/
//! ├── config.rs      # Environment-driven configuration
//! ├── utils/         # Logging setup
//! └── workflow/      # Storage, transitions, command actions, manager
//! ```
//!
//! HTTP exposure, identity verification, and file transfer live in
//! external collaborators; this crate is the durable workflow core.

pub mod config;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use utils::logger::{init_logger, init_logger_with_file};
pub use workflow::{WorkflowManager, WorkflowStorage};

// Re-export the shared vocabulary for downstream crates
pub use shared::{
    Actor, CommandError, CommandResponse, ErrorCategory, ErrorCode, OrderRecord, OrderStatus,
    Role, WorkflowCommand, WorkflowCommandPayload,
};

/// Prepare the process environment: work directory and logging
pub fn setup_environment() -> std::io::Result<Config> {
    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}
