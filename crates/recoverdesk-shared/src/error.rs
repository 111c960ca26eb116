use thiserror::Error;

use crate::types::{AgentId, CaseId};

/// Failures surfaced by the data layer to its callers.
///
/// `Validation` and `NotFound` are expected to be shown to the operator.
/// `Persistence` only reaches callers from operations whose contract is to
/// fail on storage errors (session login/logout); the activity log swallows
/// and logs its own storage failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DeskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn agent_not_found(id: AgentId) -> Self {
        Self::NotFound {
            kind: "Agent",
            id: id.to_string(),
        }
    }

    pub fn case_not_found(id: &CaseId) -> Self {
        Self::NotFound {
            kind: "Case",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = DeskError::case_not_found(&CaseId::from("LN-1042"));
        assert_eq!(err.to_string(), "Case not found: LN-1042");
        assert!(err.is_not_found());

        let err = DeskError::agent_not_found(AgentId(7));
        assert_eq!(err.to_string(), "Agent not found: 7");
    }
}
