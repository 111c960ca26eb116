//! Agent roster queries over the [`EntityStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use recoverdesk_shared::constants::PERFORMANCE_WINDOW_DAYS;
use recoverdesk_shared::{AgentId, DeskResult};

use crate::entities::EntityStore;
use crate::models::{Agent, AgentUpdate};

/// Per-agent figures shown on the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub id: AgentId,
    pub name: String,
    pub total_cases: usize,
    pub recovery_rate: f64,
    /// Case load spread over a 30-day window, rounded to two decimals.
    pub avg_cases_per_day: f64,
}

#[derive(Clone)]
pub struct AgentService {
    store: Arc<EntityStore>,
}

impl AgentService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub fn list_agents(&self) -> Vec<Agent> {
        self.store.list_agents()
    }

    pub fn get_agent(&self, id: AgentId) -> DeskResult<Agent> {
        self.store.get_agent(id)
    }

    pub fn create_agent(&self, name: &str, email: &str) -> DeskResult<Agent> {
        self.store.create_agent(name, email)
    }

    pub fn update_agent(&self, id: AgentId, update: AgentUpdate) -> DeskResult<Agent> {
        self.store.update_agent(id, update)
    }

    pub fn delete_agent(&self, id: AgentId) -> DeskResult<Agent> {
        self.store.delete_agent(id)
    }

    /// Case-insensitive substring match on name or email.
    pub fn search_agents(&self, query: &str) -> Vec<Agent> {
        let needle = query.to_lowercase();
        self.store.find_agents(|a| {
            a.name.to_lowercase().contains(&needle) || a.email.to_lowercase().contains(&needle)
        })
    }

    /// Highest recovery first. Ties keep roster order.
    pub fn top_performers(&self, limit: usize) -> Vec<Agent> {
        let mut agents = self.store.list_agents();
        agents.sort_by(|a, b| b.recovery.total_cmp(&a.recovery));
        agents.truncate(limit);
        agents
    }

    pub fn performance(&self, id: AgentId) -> DeskResult<AgentPerformance> {
        let agent = self.store.get_agent(id)?;
        let per_day = agent.cases as f64 / PERFORMANCE_WINDOW_DAYS;

        Ok(AgentPerformance {
            id: agent.id,
            name: agent.name,
            total_cases: agent.cases,
            recovery_rate: agent.recovery,
            avg_cases_per_day: (per_day * 100.0).round() / 100.0,
        })
    }
}
