//! Authoritative in-memory case and agent tables.
//!
//! Every mutating method takes the store's mutex for its whole
//! read-modify-write sequence and ends with [`reconcile`], which rebuilds the
//! two derived fields from the tables themselves:
//!
//! - `Agent::cases` is the number of cases whose `agent_id` is that agent.
//! - `Case::agent_name` is the current name of the referenced agent, or
//!   "Unassigned" when there is none.
//!
//! Because names are re-derived on every mutation, renaming an agent updates
//! all of its open cases, and deleting an agent unassigns them. Callers only
//! ever receive owned copies, so snapshots handed out earlier are unaffected.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use recoverdesk_shared::constants::{FIRST_CASE_NUMBER, MAX_RECOVERY_PERCENT, UNASSIGNED_LABEL};
use recoverdesk_shared::{AgentId, CaseId, DeskError, DeskResult};

use crate::models::{Agent, AgentUpdate, Case, CaseUpdate, NewCase, TimelineEntry};

#[derive(Debug, Default)]
struct Tables {
    agents: Vec<Agent>,
    cases: Vec<Case>,
}

impl Tables {
    fn agent_index(&self, id: AgentId) -> DeskResult<usize> {
        self.agents
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| DeskError::agent_not_found(id))
    }

    fn case_index(&self, id: &CaseId) -> DeskResult<usize> {
        self.cases
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| DeskError::case_not_found(id))
    }

    fn next_agent_id(&self) -> AgentId {
        AgentId(self.agents.iter().map(|a| a.id.0).max().unwrap_or(0) + 1)
    }

    fn next_case_id(&self) -> CaseId {
        let next = self
            .cases
            .iter()
            .filter_map(|c| c.id.number())
            .max()
            .map_or(FIRST_CASE_NUMBER, |n| n + 1);
        CaseId::from_number(next)
    }
}

/// Rebuild derived fields. Dangling agent references are cleared.
fn reconcile(tables: &mut Tables) {
    let Tables { agents, cases } = tables;

    let names: HashMap<AgentId, &str> = agents.iter().map(|a| (a.id, a.name.as_str())).collect();
    let mut counts: HashMap<AgentId, usize> = HashMap::new();

    for case in cases.iter_mut() {
        match case.agent_id.and_then(|id| names.get(&id).map(|name| (id, *name))) {
            Some((id, name)) => {
                if case.agent_name != name {
                    case.agent_name = name.to_string();
                }
                *counts.entry(id).or_default() += 1;
            }
            None => {
                case.agent_id = None;
                case.agent_name = UNASSIGNED_LABEL.to_string();
            }
        }
    }

    for agent in agents.iter_mut() {
        agent.cases = counts.get(&agent.id).copied().unwrap_or(0);
    }
}

fn require_text(field: &str, value: &str) -> DeskResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn require_amount(amount: f64) -> DeskResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DeskError::validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(amount)
}

fn require_recovery(recovery: f64) -> DeskResult<f64> {
    if !(0.0..=MAX_RECOVERY_PERCENT).contains(&recovery) {
        return Err(DeskError::validation(format!(
            "recovery must be between 0 and {MAX_RECOVERY_PERCENT}, got {recovery}"
        )));
    }
    Ok(recovery)
}

/// Case and agent tables guarded by a single lock.
#[derive(Debug, Default)]
pub struct EntityStore {
    tables: Mutex<Tables>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records. Derived fields in the input are
    /// ignored and recomputed.
    pub fn with_data(agents: Vec<Agent>, cases: Vec<Case>) -> Self {
        let mut tables = Tables { agents, cases };
        reconcile(&mut tables);
        info!(
            agents = tables.agents.len(),
            cases = tables.cases.len(),
            "entity store loaded"
        );
        Self {
            tables: Mutex::new(tables),
        }
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn list_agents(&self) -> Vec<Agent> {
        self.tables.lock().agents.clone()
    }

    pub fn list_cases(&self) -> Vec<Case> {
        self.tables.lock().cases.clone()
    }

    /// Both tables, read under one lock so they are mutually consistent.
    pub fn snapshot(&self) -> (Vec<Agent>, Vec<Case>) {
        let tables = self.tables.lock();
        (tables.agents.clone(), tables.cases.clone())
    }

    pub fn get_agent(&self, id: AgentId) -> DeskResult<Agent> {
        let tables = self.tables.lock();
        let index = tables.agent_index(id)?;
        Ok(tables.agents[index].clone())
    }

    pub fn get_case(&self, id: &CaseId) -> DeskResult<Case> {
        let tables = self.tables.lock();
        let index = tables.case_index(id)?;
        Ok(tables.cases[index].clone())
    }

    /// Cases matching `predicate`, in table order.
    pub fn find_cases(&self, predicate: impl Fn(&Case) -> bool) -> Vec<Case> {
        self.tables
            .lock()
            .cases
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }

    /// Agents matching `predicate`, in table order.
    pub fn find_agents(&self, predicate: impl Fn(&Agent) -> bool) -> Vec<Agent> {
        self.tables
            .lock()
            .agents
            .iter()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    pub fn create_agent(&self, name: &str, email: &str) -> DeskResult<Agent> {
        let name = require_text("name", name)?;
        let email = require_text("email", email)?;

        let mut tables = self.tables.lock();
        let agent = Agent {
            id: tables.next_agent_id(),
            name,
            email,
            cases: 0,
            recovery: 0.0,
        };
        tables.agents.push(agent.clone());

        info!(agent_id = %agent.id, name = %agent.name, "agent created");
        Ok(agent)
    }

    /// Merge the provided fields. Nothing changes if any field is invalid.
    pub fn update_agent(&self, id: AgentId, update: AgentUpdate) -> DeskResult<Agent> {
        let name = update.name.as_deref().map(|n| require_text("name", n)).transpose()?;
        let email = update.email.as_deref().map(|e| require_text("email", e)).transpose()?;
        let recovery = update.recovery.map(require_recovery).transpose()?;

        let mut tables = self.tables.lock();
        let index = tables.agent_index(id)?;

        let agent = &mut tables.agents[index];
        if let Some(name) = name {
            agent.name = name;
        }
        if let Some(email) = email {
            agent.email = email;
        }
        if let Some(recovery) = recovery {
            agent.recovery = recovery;
        }

        reconcile(&mut tables);

        let agent = tables.agents[index].clone();
        info!(agent_id = %agent.id, name = %agent.name, "agent updated");
        Ok(agent)
    }

    /// Remove an agent. Cases it held become unassigned.
    pub fn delete_agent(&self, id: AgentId) -> DeskResult<Agent> {
        let mut tables = self.tables.lock();
        let index = tables.agent_index(id)?;
        let removed = tables.agents.remove(index);

        reconcile(&mut tables);

        info!(
            agent_id = %removed.id,
            released_cases = removed.cases,
            "agent deleted"
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Cases
    // ------------------------------------------------------------------

    pub fn create_case(&self, new: NewCase) -> DeskResult<Case> {
        let customer = require_text("customer", &new.customer)?;
        let amount = require_amount(new.amount)?;

        let mut tables = self.tables.lock();
        if let Some(agent_id) = new.agent_id {
            tables.agent_index(agent_id)?;
        }

        let case = Case {
            id: tables.next_case_id(),
            customer,
            phone: new.phone.trim().to_string(),
            amount,
            status: new.status,
            agent_id: new.agent_id,
            agent_name: UNASSIGNED_LABEL.to_string(),
            created_at: Utc::now(),
            payment_history: new.payment_history,
            history: vec![TimelineEntry::today(new.status.as_str(), "Case opened")],
        };
        tables.cases.push(case);
        reconcile(&mut tables);

        let case = tables.cases[tables.cases.len() - 1].clone();
        info!(case_id = %case.id, agent = %case.agent_name, "case created");
        Ok(case)
    }

    /// Merge the provided fields and append any timeline entries. Nothing
    /// changes if any field is invalid.
    pub fn update_case(&self, id: &CaseId, update: CaseUpdate) -> DeskResult<Case> {
        let customer = update
            .customer
            .as_deref()
            .map(|c| require_text("customer", c))
            .transpose()?;
        let amount = update.amount.map(require_amount).transpose()?;

        let mut tables = self.tables.lock();
        let index = tables.case_index(id)?;

        let case = &mut tables.cases[index];
        if let Some(customer) = customer {
            case.customer = customer;
        }
        if let Some(phone) = update.phone {
            case.phone = phone.trim().to_string();
        }
        if let Some(amount) = amount {
            case.amount = amount;
        }
        if let Some(status) = update.status {
            case.status = status;
        }
        case.history.extend(update.history);

        let case = case.clone();
        debug!(case_id = %case.id, status = %case.status, "case updated");
        Ok(case)
    }

    /// Point a case at an agent. Re-assigning to the current agent leaves
    /// the store unchanged.
    pub fn assign_case(&self, case_id: &CaseId, agent_id: AgentId) -> DeskResult<Case> {
        let mut tables = self.tables.lock();
        let case_index = tables.case_index(case_id)?;
        tables.agent_index(agent_id)?;

        tables.cases[case_index].agent_id = Some(agent_id);
        reconcile(&mut tables);

        let case = tables.cases[case_index].clone();
        info!(case_id = %case.id, agent_id = %agent_id, agent = %case.agent_name, "case assigned");
        Ok(case)
    }

    /// Clear a case's agent. Idempotent.
    pub fn unassign_case(&self, case_id: &CaseId) -> DeskResult<Case> {
        let mut tables = self.tables.lock();
        let case_index = tables.case_index(case_id)?;

        tables.cases[case_index].agent_id = None;
        reconcile(&mut tables);

        let case = tables.cases[case_index].clone();
        info!(case_id = %case.id, "case unassigned");
        Ok(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recoverdesk_shared::CaseStatus;

    fn agent(id: u64, name: &str) -> Agent {
        Agent {
            id: AgentId(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            cases: 0,
            recovery: 0.0,
        }
    }

    fn case(n: u64, customer: &str, agent_id: Option<u64>) -> Case {
        Case {
            id: CaseId::from_number(n),
            customer: customer.to_string(),
            phone: "+91 98765 43210".to_string(),
            amount: 25_000.0,
            status: CaseStatus::Assigned,
            agent_id: agent_id.map(AgentId),
            agent_name: "stale".to_string(),
            created_at: Utc::now(),
            payment_history: Vec::new(),
            history: Vec::new(),
        }
    }

    fn ravi_priya() -> EntityStore {
        EntityStore::with_data(
            vec![agent(1, "Ravi"), agent(2, "Priya")],
            vec![case(1000, "Asha Rao", None)],
        )
    }

    fn assert_consistent(store: &EntityStore) {
        let (agents, cases) = store.snapshot();
        for a in &agents {
            let held = cases.iter().filter(|c| c.agent_id == Some(a.id)).count();
            assert_eq!(a.cases, held, "agent {} count", a.id);
        }
        for c in &cases {
            match c.agent_id {
                Some(id) => {
                    let owner = agents.iter().find(|a| a.id == id).expect("dangling agent id");
                    assert_eq!(c.agent_name, owner.name);
                }
                None => assert_eq!(c.agent_name, UNASSIGNED_LABEL),
            }
        }
    }

    #[test]
    fn with_data_recomputes_derived_fields() {
        let store = EntityStore::with_data(
            vec![agent(1, "Ravi")],
            vec![case(1000, "A", Some(1)), case(1001, "B", Some(9))],
        );
        let cases = store.list_cases();
        assert_eq!(cases[0].agent_name, "Ravi");
        assert_eq!(cases[1].agent_id, None);
        assert_eq!(cases[1].agent_name, UNASSIGNED_LABEL);
        assert_eq!(store.get_agent(AgentId(1)).unwrap().cases, 1);
    }

    #[test]
    fn assign_then_unassign() {
        let store = ravi_priya();
        let id = CaseId::from("LN-1000");

        let assigned = store.assign_case(&id, AgentId(1)).unwrap();
        assert_eq!(assigned.agent_id, Some(AgentId(1)));
        assert_eq!(assigned.agent_name, "Ravi");
        assert_eq!(store.get_agent(AgentId(1)).unwrap().cases, 1);
        assert_eq!(store.get_agent(AgentId(2)).unwrap().cases, 0);

        let released = store.unassign_case(&id).unwrap();
        assert_eq!(released.agent_id, None);
        assert_eq!(released.agent_name, UNASSIGNED_LABEL);
        assert_eq!(store.get_agent(AgentId(1)).unwrap().cases, 0);
    }

    #[test]
    fn assign_and_unassign_are_idempotent() {
        let store = ravi_priya();
        let id = CaseId::from("LN-1000");

        let before = store.snapshot();
        store.unassign_case(&id).unwrap();
        assert_eq!(store.snapshot(), before);

        store.assign_case(&id, AgentId(2)).unwrap();
        let once = store.snapshot();
        store.assign_case(&id, AgentId(2)).unwrap();
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn assign_unknown_ids_fail_without_change() {
        let store = ravi_priya();
        let before = store.snapshot();

        let err = store.assign_case(&CaseId::from("LN-9999"), AgentId(1)).unwrap_err();
        assert!(err.is_not_found());
        let err = store.assign_case(&CaseId::from("LN-1000"), AgentId(42)).unwrap_err();
        assert!(err.is_not_found());
        let err = store.unassign_case(&CaseId::from("LN-9999")).unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn counts_hold_across_operation_sequence() {
        let store = EntityStore::with_data(
            vec![agent(1, "Ravi"), agent(2, "Priya"), agent(3, "Arun")],
            (0..12).map(|i| case(1000 + i, "C", Some(i % 3 + 1))).collect(),
        );

        for step in 0..40u64 {
            let id = CaseId::from_number(1000 + (step * 7) % 12);
            if step % 4 == 3 {
                store.unassign_case(&id).unwrap();
            } else {
                store.assign_case(&id, AgentId(step % 3 + 1)).unwrap();
            }
            assert_consistent(&store);
        }
    }

    #[test]
    fn rename_propagates_to_assigned_cases() {
        let store = ravi_priya();
        let id = CaseId::from("LN-1000");
        let handed_out = store.assign_case(&id, AgentId(1)).unwrap();

        store
            .update_agent(
                AgentId(1),
                AgentUpdate {
                    name: Some("Ravi Kumar".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.get_case(&id).unwrap().agent_name, "Ravi Kumar");
        // Copies returned earlier are not retroactively changed.
        assert_eq!(handed_out.agent_name, "Ravi");
    }

    #[test]
    fn update_unknown_agent_leaves_state() {
        let store = ravi_priya();
        let before = store.snapshot();

        let err = store
            .update_agent(
                AgentId(77),
                AgentUpdate {
                    name: Some("Ghost".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn update_agent_rejects_blank_name_and_bad_recovery() {
        let store = ravi_priya();
        let blank = AgentUpdate {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(store.update_agent(AgentId(1), blank).unwrap_err().is_validation());

        let over = AgentUpdate {
            recovery: Some(120.0),
            ..Default::default()
        };
        assert!(store.update_agent(AgentId(1), over).unwrap_err().is_validation());

        let ok = AgentUpdate {
            recovery: Some(81.5),
            ..Default::default()
        };
        assert_eq!(store.update_agent(AgentId(1), ok).unwrap().recovery, 81.5);
    }

    #[test]
    fn delete_agent_releases_cases() {
        let store = ravi_priya();
        let id = CaseId::from("LN-1000");
        store.assign_case(&id, AgentId(2)).unwrap();

        let removed = store.delete_agent(AgentId(2)).unwrap();
        assert_eq!(removed.name, "Priya");
        assert_eq!(removed.cases, 1);

        let case = store.get_case(&id).unwrap();
        assert_eq!(case.agent_id, None);
        assert_eq!(case.agent_name, UNASSIGNED_LABEL);
        assert!(store.delete_agent(AgentId(2)).unwrap_err().is_not_found());
        assert_consistent(&store);
    }

    #[test]
    fn create_agent_validates_and_numbers() {
        let store = ravi_priya();
        assert!(store.create_agent("", "x@example.com").unwrap_err().is_validation());
        assert!(store.create_agent("Neha", " ").unwrap_err().is_validation());

        let neha = store.create_agent(" Neha ", "neha@example.com").unwrap();
        assert_eq!(neha.id, AgentId(3));
        assert_eq!(neha.name, "Neha");
        assert_eq!(neha.cases, 0);
        assert_eq!(neha.recovery, 0.0);
    }

    #[test]
    fn create_case_numbers_sequentially() {
        let empty = EntityStore::new();
        let first = empty.create_case(NewCase::new("Asha Rao", "1", 1200.0)).unwrap();
        assert_eq!(first.id.as_str(), "LN-1000");
        assert_eq!(first.agent_name, UNASSIGNED_LABEL);
        assert_eq!(first.history.len(), 1);

        let store = ravi_priya();
        let mut new = NewCase::new("Vikram Singh", "2", 5000.0);
        new.agent_id = Some(AgentId(1));
        let created = store.create_case(new).unwrap();
        assert_eq!(created.id.as_str(), "LN-1001");
        assert_eq!(created.agent_name, "Ravi");
        assert_eq!(store.get_agent(AgentId(1)).unwrap().cases, 1);
    }

    #[test]
    fn create_case_rejects_bad_input() {
        let store = ravi_priya();
        assert!(store
            .create_case(NewCase::new("", "1", 10.0))
            .unwrap_err()
            .is_validation());
        assert!(store
            .create_case(NewCase::new("A", "1", 0.0))
            .unwrap_err()
            .is_validation());

        let mut orphan = NewCase::new("A", "1", 10.0);
        orphan.agent_id = Some(AgentId(99));
        assert!(store.create_case(orphan).unwrap_err().is_not_found());
        assert_eq!(store.list_cases().len(), 1);
    }

    #[test]
    fn update_case_merges_and_appends_history() {
        let store = ravi_priya();
        let id = CaseId::from("LN-1000");

        let updated = store
            .update_case(
                &id,
                CaseUpdate {
                    status: Some(CaseStatus::FollowUp),
                    history: vec![TimelineEntry::today("FOLLOW_UP", "promised to pay")],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, CaseStatus::FollowUp);
        assert_eq!(updated.customer, "Asha Rao");
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.history[0].note, "promised to pay");

        let err = store
            .update_case(&CaseId::from("LN-1"), CaseUpdate::default())
            .unwrap_err();
        assert!(err.is_not_found());

        let bad = CaseUpdate {
            amount: Some(-5.0),
            status: Some(CaseStatus::Closed),
            ..Default::default()
        };
        assert!(store.update_case(&id, bad).unwrap_err().is_validation());
        assert_eq!(store.get_case(&id).unwrap().status, CaseStatus::FollowUp);
    }

    #[test]
    fn snapshots_do_not_alias_store() {
        let store = ravi_priya();
        let mut agents = store.list_agents();
        agents[0].name = "Mutated".into();
        agents[0].cases = 99;
        assert_eq!(store.get_agent(AgentId(1)).unwrap().name, "Ravi");
        assert_eq!(store.get_agent(AgentId(1)).unwrap().cases, 0);
    }

    #[test]
    fn concurrent_assignments_keep_counts() {
        use std::sync::Arc;

        let store = Arc::new(EntityStore::with_data(
            vec![agent(1, "Ravi"), agent(2, "Priya")],
            (0..20).map(|i| case(1000 + i, "C", None)).collect(),
        ));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50u64 {
                        let id = CaseId::from_number(1000 + (i + t) % 20);
                        if (i + t) % 5 == 0 {
                            store.unassign_case(&id).unwrap();
                        } else {
                            store.assign_case(&id, AgentId(t % 2 + 1)).unwrap();
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_consistent(&store);
    }
}
