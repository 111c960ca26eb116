//! Case queries and workflow helpers over the [`EntityStore`].

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;

use recoverdesk_shared::constants::CALL_INITIATED_STAGE;
use recoverdesk_shared::{AgentId, CaseId, CaseStatus, DeskResult};

use crate::entities::EntityStore;
use crate::models::{Case, CaseUpdate, TimelineEntry};

/// Ordering for case listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Largest outstanding amount first.
    Amount,
    /// Customer name, alphabetical.
    Customer,
}

impl FromStr for CaseSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "date" | "created" => Ok(Self::Newest),
            "amount" => Ok(Self::Amount),
            "customer" | "name" => Ok(Self::Customer),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct CaseService {
    store: Arc<EntityStore>,
}

impl CaseService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub fn list_cases(&self) -> Vec<Case> {
        self.store.list_cases()
    }

    pub fn get_case(&self, id: &CaseId) -> DeskResult<Case> {
        self.store.get_case(id)
    }

    pub fn cases_by_agent(&self, agent_id: AgentId) -> Vec<Case> {
        self.store.find_cases(|c| c.agent_id == Some(agent_id))
    }

    pub fn unassigned_cases(&self) -> Vec<Case> {
        self.store.find_cases(|c| c.agent_id.is_none())
    }

    pub fn cases_by_status(&self, status: CaseStatus) -> Vec<Case> {
        self.store.find_cases(|c| c.status == status)
    }

    /// Case-insensitive substring match on customer name or loan id.
    pub fn search_cases(&self, query: &str) -> Vec<Case> {
        let needle = query.to_lowercase();
        self.store.find_cases(|c| matches_query(c, &needle))
    }

    /// Filtered and ordered listing, as shown on the case board.
    pub fn browse(&self, status: Option<CaseStatus>, query: &str, sort: CaseSort) -> Vec<Case> {
        let mut cases = match status {
            Some(status) => self.cases_by_status(status),
            None => self.list_cases(),
        };
        if !query.is_empty() {
            let needle = query.to_lowercase();
            cases.retain(|c| matches_query(c, &needle));
        }
        sort_cases(&mut cases, sort);
        cases
    }

    pub fn update_case(&self, id: &CaseId, update: CaseUpdate) -> DeskResult<Case> {
        self.store.update_case(id, update)
    }

    pub fn assign_case(&self, case_id: &CaseId, agent_id: AgentId) -> DeskResult<Case> {
        self.store.assign_case(case_id, agent_id)
    }

    pub fn unassign_case(&self, case_id: &CaseId) -> DeskResult<Case> {
        self.store.unassign_case(case_id)
    }

    /// Move a case to `status` and note the change on its timeline.
    pub fn change_status(&self, id: &CaseId, status: CaseStatus, note: &str) -> DeskResult<Case> {
        self.store.update_case(
            id,
            CaseUpdate {
                status: Some(status),
                history: vec![TimelineEntry::today(status.as_str(), note.trim())],
                ..Default::default()
            },
        )
    }

    /// Record an outgoing call to the case's customer on its timeline.
    pub fn initiate_call(&self, id: &CaseId) -> DeskResult<Case> {
        let case = self.store.get_case(id)?;
        let note = format!(
            "Call initiated to {} at {}",
            case.customer,
            Utc::now().format("%H:%M:%S")
        );
        self.store.update_case(
            id,
            CaseUpdate {
                history: vec![TimelineEntry::today(CALL_INITIATED_STAGE, note)],
                ..Default::default()
            },
        )
    }
}

/// `needle` must already be lowercase.
fn matches_query(case: &Case, needle: &str) -> bool {
    case.customer.to_lowercase().contains(needle) || case.id.as_str().to_lowercase().contains(needle)
}

pub fn sort_cases(cases: &mut [Case], sort: CaseSort) {
    match sort {
        CaseSort::Newest => cases.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        CaseSort::Amount => cases.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        CaseSort::Customer => cases.sort_by(|a, b| a.customer.cmp(&b.customer)),
    }
}
