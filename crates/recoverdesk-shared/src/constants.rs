/// Application name
pub const APP_NAME: &str = "Recoverdesk";

/// Key-value namespace: activity log blob (JSON array, newest first)
pub const ACTIVITY_LOGS_KEY: &str = "activityLogs";

/// Key-value namespace: signed-in user profile (JSON object)
pub const USER_KEY: &str = "user";

/// Key-value namespace: opaque session token
pub const TOKEN_KEY: &str = "token";

/// Display name carried by a case with no agent
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Prefix of every loan case identifier
pub const CASE_ID_PREFIX: &str = "LN-";

/// Number given to the first case of an empty store (`LN-1000`)
pub const FIRST_CASE_NUMBER: u64 = 1000;

/// Timeline stage recorded when an agent dials the customer
pub const CALL_INITIATED_STAGE: &str = "CALL_INITIATED";

/// Window used to average an agent's case load
pub const PERFORMANCE_WINDOW_DAYS: f64 = 30.0;

/// Default size of the top performers board
pub const DEFAULT_TOP_PERFORMERS: usize = 5;

/// Default number of entries returned by `recent`
pub const DEFAULT_RECENT_LOGS: usize = 10;

/// Cases shown on an agent's own dashboard
pub const AGENT_DASHBOARD_RECENT: usize = 10;

/// Upper bound for an agent's recovery percentage
pub const MAX_RECOVERY_PERCENT: f64 = 100.0;
