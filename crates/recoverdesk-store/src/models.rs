//! Domain model structs.
//!
//! Field names serialize in camelCase so that records and persisted blobs
//! keep the layout the web front end reads (`agentId`, `createdAt`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use recoverdesk_shared::{AgentId, CaseId, CaseStatus, LogAction, LogEntity, Role};

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A collection staff member who can be assigned cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub email: String,
    /// Number of cases currently pointing at this agent. Derived by the
    /// entity store after every mutation; never set directly.
    pub cases: usize,
    /// Recovery rate in percent.
    pub recovery: f64,
}

/// Partial update applied by [`EntityStore::update_agent`].
///
/// [`EntityStore::update_agent`]: crate::EntityStore::update_agent
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub recovery: Option<f64>,
}

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

/// A loan-collection record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub customer: String,
    pub phone: String,
    pub amount: f64,
    pub status: CaseStatus,
    pub agent_id: Option<AgentId>,
    /// Name of the agent behind `agent_id`, or "Unassigned".
    pub agent_name: String,
    pub created_at: DateTime<Utc>,
    pub payment_history: Vec<PaymentRecord>,
    pub history: Vec<TimelineEntry>,
}

impl Case {
    pub fn is_assigned(&self) -> bool {
        self.agent_id.is_some()
    }
}

/// A payment received (or expected) against a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub date: NaiveDate,
    pub amount: f64,
    /// Free-form settlement state, e.g. "Received" or "Pending".
    pub status: String,
    /// Payment rail, e.g. "UPI" or "Bank Transfer".
    pub method: String,
}

/// One step on a case's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    /// A case status name or a call marker such as `CALL_INITIATED`.
    pub stage: String,
    pub note: String,
    pub date: NaiveDate,
}

impl TimelineEntry {
    pub fn today(stage: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            note: note.into(),
            date: Utc::now().date_naive(),
        }
    }
}

/// Input for [`EntityStore::create_case`].
///
/// [`EntityStore::create_case`]: crate::EntityStore::create_case
#[derive(Debug, Clone)]
pub struct NewCase {
    pub customer: String,
    pub phone: String,
    pub amount: f64,
    pub status: CaseStatus,
    pub agent_id: Option<AgentId>,
    pub payment_history: Vec<PaymentRecord>,
}

impl NewCase {
    pub fn new(customer: impl Into<String>, phone: impl Into<String>, amount: f64) -> Self {
        Self {
            customer: customer.into(),
            phone: phone.into(),
            amount,
            status: CaseStatus::Assigned,
            agent_id: None,
            payment_history: Vec::new(),
        }
    }
}

/// Partial update applied by [`EntityStore::update_case`]. Assignment is
/// deliberately absent: it only changes through assign/unassign.
///
/// [`EntityStore::update_case`]: crate::EntityStore::update_case
#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub customer: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<CaseStatus>,
    /// Timeline entries appended after the existing history.
    pub history: Vec<TimelineEntry>,
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// One audit record. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub role: Role,
    pub action: LogAction,
    pub entity: LogEntity,
    pub details: String,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Profile of the signed-in operator, persisted under the `user` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
