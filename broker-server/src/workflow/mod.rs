//! Order workflow engine
//!
//! Command processing pipeline: a [`WorkflowCommand`] is converted to
//! an action, the action validates role and state guards and mutates
//! records through a [`traits::CommandContext`], and the manager
//! persists everything in a single redb write transaction before
//! broadcasting any alerts.
//!
//! [`WorkflowCommand`]: shared::workflow::WorkflowCommand

pub mod actions;
pub mod manager;
pub mod storage;
pub mod traits;
pub mod transitions;

pub use manager::{ManagerError, ManagerResult, WorkflowManager};
pub use storage::{StorageError, StorageResult, WorkflowStorage};
pub use traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError};
pub use transitions::{check_transition, DELEGATE_TARGETS, SUPERVISOR_TARGETS};
