//! Dashboard figures computed from the current case table.

use serde::{Deserialize, Serialize};

use recoverdesk_shared::constants::AGENT_DASHBOARD_RECENT;
use recoverdesk_shared::{AgentId, CaseStatus};

use crate::cases::{sort_cases, CaseService, CaseSort};
use crate::models::Case;

/// Case counts by workflow state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub assigned: usize,
    pub follow_up: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl StatusBreakdown {
    fn tally<'a>(cases: impl IntoIterator<Item = &'a Case>) -> Self {
        let mut counts = Self::default();
        for case in cases {
            match case.status {
                CaseStatus::Assigned => counts.assigned += 1,
                CaseStatus::FollowUp => counts.follow_up += 1,
                CaseStatus::Resolved => counts.resolved += 1,
                CaseStatus::Closed => counts.closed += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.assigned + self.follow_up + self.resolved + self.closed
    }

    /// Resolved plus closed.
    pub fn settled(&self) -> usize {
        self.resolved + self.closed
    }
}

/// Administrator overview of the whole portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_cases: usize,
    pub resolved_cases: usize,
    pub unassigned_cases: usize,
    /// Sum of amounts on cases that are not yet settled.
    pub pending_amount: f64,
    /// Settled share of all cases in percent, one decimal.
    pub efficiency: f64,
    pub by_status: StatusBreakdown,
}

/// An agent's own dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub agent_id: AgentId,
    pub total_cases: usize,
    /// Resolved plus closed.
    pub resolved_cases: usize,
    pub pending_cases: usize,
    pub follow_up_cases: usize,
    /// Newest cases first.
    pub recent_cases: Vec<Case>,
}

impl CaseService {
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        let cases = self.list_cases();
        let by_status = StatusBreakdown::tally(&cases);

        let pending_amount: f64 = cases
            .iter()
            .filter(|c| !c.status.is_settled())
            .map(|c| c.amount)
            .sum();
        let efficiency = if cases.is_empty() {
            0.0
        } else {
            let ratio = by_status.settled() as f64 / cases.len() as f64 * 100.0;
            (ratio * 10.0).round() / 10.0
        };

        PortfolioSummary {
            total_cases: cases.len(),
            resolved_cases: by_status.settled(),
            unassigned_cases: cases.iter().filter(|c| !c.is_assigned()).count(),
            pending_amount,
            efficiency,
            by_status,
        }
    }

    /// Figures for one agent's caseload, looked up by id.
    pub fn agent_summary(&self, agent_id: AgentId) -> AgentSummary {
        let mut cases = self.cases_by_agent(agent_id);
        let by_status = StatusBreakdown::tally(&cases);

        sort_cases(&mut cases, CaseSort::Newest);
        cases.truncate(AGENT_DASHBOARD_RECENT);

        AgentSummary {
            agent_id,
            total_cases: by_status.total(),
            resolved_cases: by_status.settled(),
            pending_cases: by_status.assigned,
            follow_up_cases: by_status.follow_up,
            recent_cases: cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use recoverdesk_shared::CaseId;

    use super::*;
    use crate::entities::EntityStore;
    use crate::mock::MockConfig;

    fn service() -> CaseService {
        CaseService::new(Arc::new(EntityStore::from_mock(&MockConfig::default())))
    }

    #[test]
    fn portfolio_counts() {
        let svc = service();
        let summary = svc.portfolio_summary();

        assert_eq!(summary.total_cases, 25);
        assert_eq!(summary.by_status.assigned, 7);
        assert_eq!(summary.by_status.follow_up, 6);
        assert_eq!(summary.resolved_cases, 12);
        assert_eq!(summary.efficiency, 48.0);
        assert_eq!(summary.unassigned_cases, 0);

        let open: f64 = svc
            .list_cases()
            .iter()
            .filter(|c| !c.status.is_settled())
            .map(|c| c.amount)
            .sum();
        assert_eq!(summary.pending_amount, open);
    }

    #[test]
    fn empty_portfolio() {
        let svc = CaseService::new(Arc::new(EntityStore::new()));
        let summary = svc.portfolio_summary();
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.efficiency, 0.0);
    }

    #[test]
    fn agent_summary_follows_assignment() {
        let svc = service();
        let ravi = svc.agent_summary(AgentId(1));
        assert_eq!(ravi.total_cases, 9);
        assert_eq!(ravi.recent_cases.len(), 9);
        assert_eq!(ravi.recent_cases[0].id.as_str(), "LN-1000");

        svc.assign_case(&CaseId::from("LN-1001"), AgentId(1)).unwrap();
        let ravi = svc.agent_summary(AgentId(1));
        assert_eq!(ravi.total_cases, 10);
        assert_eq!(
            ravi.resolved_cases + ravi.pending_cases + ravi.follow_up_cases,
            10
        );

        assert_eq!(svc.agent_summary(AgentId(42)).total_cases, 0);
    }
}
