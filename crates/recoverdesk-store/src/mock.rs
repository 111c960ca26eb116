//! Demonstration data set.
//!
//! Three agents and a configurable number of cases with fixture customers.
//! Amounts are drawn from a seeded generator so two stores built from the
//! same [`MockConfig`] hold identical records (apart from `created_at`,
//! which is relative to now).

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use recoverdesk_shared::constants::FIRST_CASE_NUMBER;
use recoverdesk_shared::{AgentId, CaseId, CaseStatus};

use crate::entities::EntityStore;
use crate::models::{Agent, Case, PaymentRecord, TimelineEntry};

const CUSTOMERS: [(&str, &str); 5] = [
    ("Asha Rao", "+91 98765 43210"),
    ("Vikram Singh", "+91 98765 43211"),
    ("Neha Sharma", "+91 98765 43212"),
    ("Ravi Kumar", "+91 98765 43213"),
    ("Priya Patel", "+91 98765 43214"),
];

const AGENTS: [(&str, &str, f64); 3] = [
    ("Ravi Kumar", "ravi@example.com", 72.0),
    ("Priya Patel", "priya@example.com", 68.0),
    ("Arun Jain", "arun@example.com", 50.0),
];

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub seed: u64,
    pub case_count: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            case_count: 25,
        }
    }
}

pub fn mock_agents() -> Vec<Agent> {
    AGENTS
        .iter()
        .zip(1u64..)
        .map(|(&(name, email, recovery), id)| Agent {
            id: AgentId(id),
            name: name.to_string(),
            email: email.to_string(),
            cases: 0,
            recovery,
        })
        .collect()
}

pub fn mock_cases(config: &MockConfig) -> Vec<Case> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let now = Utc::now();

    (0..config.case_count)
        .map(|i| {
            let (customer, phone) = CUSTOMERS[i % CUSTOMERS.len()];
            let amount = f64::from(rng.gen_range(10_000u32..60_000));
            let received = f64::from(rng.gen_range(1_000u32..6_000));
            let pending = f64::from(rng.gen_range(1_000u32..6_000));

            Case {
                id: CaseId::from_number(FIRST_CASE_NUMBER + i as u64),
                customer: customer.to_string(),
                phone: phone.to_string(),
                amount,
                status: CaseStatus::ALL[i % CaseStatus::ALL.len()],
                agent_id: Some(AgentId((i % AGENTS.len()) as u64 + 1)),
                // Filled in by the store's reconcile pass.
                agent_name: String::new(),
                created_at: now - Duration::days(i as i64),
                payment_history: vec![
                    PaymentRecord {
                        date: fixture_date(2025, 10, 1),
                        amount: received,
                        status: "Received".to_string(),
                        method: "UPI".to_string(),
                    },
                    PaymentRecord {
                        date: fixture_date(2025, 10, 15),
                        amount: pending,
                        status: "Pending".to_string(),
                        method: "Bank Transfer".to_string(),
                    },
                ],
                history: vec![
                    TimelineEntry {
                        stage: CaseStatus::Assigned.as_str().to_string(),
                        note: "Assigned to agent".to_string(),
                        date: fixture_date(2025, 11, 1),
                    },
                    TimelineEntry {
                        stage: CaseStatus::FollowUp.as_str().to_string(),
                        note: "Follow-up call done".to_string(),
                        date: fixture_date(2025, 11, 3),
                    },
                ],
            }
        })
        .collect()
}

fn fixture_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl EntityStore {
    /// Store pre-filled with the demonstration agents and cases.
    pub fn from_mock(config: &MockConfig) -> Self {
        Self::with_data(mock_agents(), mock_cases(config))
    }
}
