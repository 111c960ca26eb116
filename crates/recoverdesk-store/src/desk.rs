//! User-facing actions.
//!
//! A [`Desk`] is opened for one signed-in user. Each mutating call goes to
//! the entity store first and, only if that succeeds, appends an entry to
//! the activity log under the acting user's name and role.

use std::sync::Arc;

use tracing::info;

use recoverdesk_shared::{AgentId, CaseId, CaseStatus, DeskError, DeskResult, LogAction, LogEntity};

use crate::activity::ActivityLog;
use crate::agents::AgentService;
use crate::cases::CaseService;
use crate::entities::EntityStore;
use crate::models::{Agent, AgentUpdate, Case, LogEntry, UserProfile};

pub struct Desk {
    store: Arc<EntityStore>,
    log: Arc<ActivityLog>,
    actor: UserProfile,
}

impl Desk {
    pub fn new(store: Arc<EntityStore>, log: Arc<ActivityLog>, actor: UserProfile) -> Self {
        Self { store, log, actor }
    }

    pub fn actor(&self) -> &UserProfile {
        &self.actor
    }

    pub fn cases(&self) -> CaseService {
        CaseService::new(self.store.clone())
    }

    pub fn agents(&self) -> AgentService {
        AgentService::new(self.store.clone())
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    // -- agents -------------------------------------------------------------

    pub fn add_agent(&self, name: &str, email: &str) -> DeskResult<Agent> {
        self.require_admin("add agents")?;
        let agent = self.store.create_agent(name, email)?;
        self.record(
            LogAction::Created,
            LogEntity::Agent,
            format!("Created new agent: {} ({})", agent.name, agent.email),
        );
        Ok(agent)
    }

    pub fn edit_agent(&self, id: AgentId, update: AgentUpdate) -> DeskResult<Agent> {
        self.require_admin("edit agents")?;
        let agent = self.store.update_agent(id, update)?;
        self.record(
            LogAction::Updated,
            LogEntity::Agent,
            format!("Updated agent: {} ({})", agent.name, agent.email),
        );
        Ok(agent)
    }

    /// Remove an agent. Their cases become unassigned.
    pub fn remove_agent(&self, id: AgentId) -> DeskResult<Agent> {
        self.require_admin("delete agents")?;
        let agent = self.store.delete_agent(id)?;
        self.record(
            LogAction::Deleted,
            LogEntity::Agent,
            format!("Deleted agent: {}", agent.name),
        );
        Ok(agent)
    }

    // -- cases --------------------------------------------------------------

    pub fn assign_case(&self, case_id: &CaseId, agent_id: AgentId) -> DeskResult<Case> {
        self.require_admin("assign cases")?;
        let case = self.store.assign_case(case_id, agent_id)?;
        self.record(
            LogAction::Assigned,
            LogEntity::Case,
            format!(
                "Assigned case {} ({}) to {}",
                case.id, case.customer, case.agent_name
            ),
        );
        Ok(case)
    }

    pub fn unassign_case(&self, case_id: &CaseId) -> DeskResult<Case> {
        self.require_admin("unassign cases")?;
        let case = self.store.unassign_case(case_id)?;
        self.record(
            LogAction::Unassigned,
            LogEntity::Case,
            format!("Unassigned case {} ({})", case.id, case.customer),
        );
        Ok(case)
    }

    pub fn change_case_status(
        &self,
        case_id: &CaseId,
        status: CaseStatus,
        note: &str,
    ) -> DeskResult<Case> {
        let case = self.cases().change_status(case_id, status, note)?;
        let note = note.trim();
        let details = if note.is_empty() {
            format!("Updated case {} status to {}", case.id, status)
        } else {
            format!("Updated case {} status to {}: {}", case.id, status, note)
        };
        self.record(LogAction::Updated, LogEntity::Case, details);
        Ok(case)
    }

    pub fn call_customer(&self, case_id: &CaseId) -> DeskResult<Case> {
        let case = self.cases().initiate_call(case_id)?;
        self.record(
            LogAction::Updated,
            LogEntity::Case,
            format!("Initiated call to {} for case {}", case.customer, case.id),
        );
        Ok(case)
    }

    // -- activity -----------------------------------------------------------

    /// Empty the activity log. Open to every role.
    pub fn clear_activity(&self) {
        info!(user = %self.actor.email, "clearing activity log");
        self.log.clear();
    }

    fn record(&self, action: LogAction, entity: LogEntity, details: String) -> LogEntry {
        info!(user = %self.actor.email, %action, %entity, "{details}");
        self.log
            .append(&self.actor.name, self.actor.role, action, entity, details)
    }

    fn require_admin(&self, what: &str) -> DeskResult<()> {
        if self.actor.is_admin() {
            Ok(())
        } else {
            Err(DeskError::validation(format!(
                "only administrators can {what}"
            )))
        }
    }
}
