//! Types shared by every recoverdesk crate: identifiers, workflow enums,
//! storage keys and the error taxonomy surfaced to callers.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{DeskError, DeskResult};
pub use types::{AgentId, CaseId, CaseStatus, LogAction, LogEntity, Role};
