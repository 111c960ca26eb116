//! Append-only activity log.
//!
//! Entries are kept newest first and the whole list is written back to the
//! key-value namespace under `activityLogs` after every change. Storage
//! failures never reach the caller: a failed read starts from an empty log,
//! a failed write keeps the in-memory change and is logged.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use recoverdesk_shared::constants::ACTIVITY_LOGS_KEY;
use recoverdesk_shared::{LogAction, LogEntity, Role};

use crate::kv::KeyValueStore;
use crate::models::LogEntry;

struct LogState {
    /// Newest first.
    entries: Vec<LogEntry>,
    /// Highest id handed out so far.
    last_id: u64,
}

pub struct ActivityLog {
    kv: Arc<dyn KeyValueStore>,
    state: Mutex<LogState>,
}

impl ActivityLog {
    /// Load the log from `kv`, seeding the bootstrap entries if the key has
    /// never been written.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let (entries, seeded) = match kv.get(ACTIVITY_LOGS_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<LogEntry>>(&blob) {
                Ok(entries) => (entries, false),
                Err(e) => {
                    warn!(error = %e, "corrupt activity log blob, starting empty");
                    (Vec::new(), false)
                }
            },
            Ok(None) => (seed_entries(Utc::now()), true),
            Err(e) => {
                warn!(error = %e, "activity log unreadable, starting empty");
                (Vec::new(), false)
            }
        };

        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        info!(entries = entries.len(), seeded, "activity log opened");

        let log = Self {
            kv,
            state: Mutex::new(LogState { entries, last_id }),
        };
        if seeded {
            log.persist(&log.state.lock().entries);
        }
        log
    }

    /// Record an action. The entry goes to the head of the log.
    pub fn append(
        &self,
        user: &str,
        role: Role,
        action: LogAction,
        entity: LogEntity,
        details: impl Into<String>,
    ) -> LogEntry {
        let mut state = self.state.lock();

        let now = Utc::now();
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(state.last_id + 1);
        state.last_id = id;

        let entry = LogEntry {
            id,
            timestamp: now,
            user: user.to_string(),
            role,
            action,
            entity,
            details: details.into(),
        };
        state.entries.insert(0, entry.clone());
        self.persist(&state.entries);

        debug!(id, action = %entry.action, entity = %entry.entity, "activity recorded");
        entry
    }

    /// Every entry, newest first.
    pub fn list(&self) -> Vec<LogEntry> {
        self.state.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `limit` newest entries.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.state.lock().entries.iter().take(limit).cloned().collect()
    }

    pub fn filter_by_entity(&self, entity: LogEntity) -> Vec<LogEntry> {
        self.filter(|e| e.entity == entity)
    }

    pub fn filter_by_user(&self, user: &str) -> Vec<LogEntry> {
        self.filter(|e| e.user == user)
    }

    pub fn filter_by_action(&self, action: &LogAction) -> Vec<LogEntry> {
        self.filter(|e| &e.action == action)
    }

    /// Entries with `start <= timestamp <= end`.
    pub fn filter_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<LogEntry> {
        self.filter(|e| e.timestamp >= start && e.timestamp <= end)
    }

    /// Case-insensitive match on details or user name, optionally narrowed
    /// to one entity kind. An empty query matches everything.
    pub fn search(&self, query: &str, entity: Option<LogEntity>) -> Vec<LogEntry> {
        let needle = query.to_lowercase();
        self.filter(|e| {
            entity.map_or(true, |wanted| e.entity == wanted)
                && (needle.is_empty()
                    || e.details.to_lowercase().contains(&needle)
                    || e.user.to_lowercase().contains(&needle))
        })
    }

    /// Drop every entry and persist the empty log.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        self.persist(&state.entries);
        info!(dropped, "activity log cleared");
    }

    fn filter(&self, predicate: impl Fn(&LogEntry) -> bool) -> Vec<LogEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    fn persist(&self, entries: &[LogEntry]) {
        let blob = match serde_json::to_string(entries) {
            Ok(blob) => blob,
            Err(e) => {
                error!(error = %e, "failed to encode activity log");
                return;
            }
        };
        if let Err(e) = self.kv.set(ACTIVITY_LOGS_KEY, &blob) {
            error!(error = %e, entries = entries.len(), "failed to persist activity log");
        }
    }
}

/// Illustrative history written the first time a namespace is opened.
fn seed_entries(now: DateTime<Utc>) -> Vec<LogEntry> {
    vec![
        LogEntry {
            id: 1,
            timestamp: now - Duration::hours(1),
            user: "Admin User".to_string(),
            role: Role::Admin,
            action: LogAction::Created,
            entity: LogEntity::Agent,
            details: "Added new agent: Ravi Kumar".to_string(),
        },
        LogEntry {
            id: 2,
            timestamp: now - Duration::hours(2),
            user: "Agent User".to_string(),
            role: Role::Agent,
            action: LogAction::Updated,
            entity: LogEntity::Case,
            details: "Updated case LN-1001 status to FOLLOW_UP".to_string(),
        },
        LogEntry {
            id: 3,
            timestamp: now - Duration::hours(3),
            user: "Admin User".to_string(),
            role: Role::Admin,
            action: LogAction::Assigned,
            entity: LogEntity::Case,
            details: "Assigned case LN-1005 to Priya Patel".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StoreError};
    use crate::kv::MemoryKv;

    /// Backend whose reads and/or writes always fail.
    struct BrokenKv {
        reads: bool,
        writes: bool,
    }

    impl KeyValueStore for BrokenKv {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            if self.reads {
                return Err(StoreError::Io(std::io::Error::other("storage unavailable")));
            }
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            if self.writes {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn remove_all(&self) -> Result<()> {
            Ok(())
        }
    }

    fn empty_log() -> (ActivityLog, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        kv.set(ACTIVITY_LOGS_KEY, "[]").unwrap();
        (ActivityLog::open(kv.clone()), kv)
    }

    fn admin(log: &ActivityLog, action: LogAction, entity: LogEntity, details: &str) -> LogEntry {
        log.append("Admin User", Role::Admin, action, entity, details)
    }

    #[test]
    fn first_open_seeds_three_entries_once() {
        let kv = Arc::new(MemoryKv::new());
        let log = ActivityLog::open(kv.clone());

        let entries = log.list();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(entries[0].details, "Added new agent: Ravi Kumar");
        assert!(entries[0].timestamp > entries[1].timestamp);

        log.clear();
        let reopened = ActivityLog::open(kv);
        assert!(reopened.is_empty());
    }

    #[test]
    fn append_goes_to_head() {
        let (log, _) = empty_log();
        admin(&log, LogAction::Created, LogEntity::Agent, "first");
        let second = admin(&log, LogAction::Updated, LogEntity::Case, "second");

        let entries = log.list();
        assert_eq!(entries[0], second);
        assert_eq!(entries[1].details, "first");
        assert!(entries[0].id > entries[1].id);
    }

    #[test]
    fn ids_are_unique_in_a_burst() {
        let (log, _) = empty_log();
        for i in 0..200 {
            admin(&log, LogAction::Updated, LogEntity::Case, &format!("e{i}"));
        }
        let mut ids: Vec<u64> = log.list().iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn recent_is_prefix_of_list() {
        let (log, _) = empty_log();
        for i in 0..6 {
            admin(&log, LogAction::Updated, LogEntity::Case, &format!("e{i}"));
        }
        let recent = log.recent(4);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[..], log.list()[..4]);
        assert_eq!(recent[0].details, "e5");
        assert_eq!(log.recent(50).len(), 6);
    }

    #[test]
    fn filters() {
        let (log, _) = empty_log();
        admin(&log, LogAction::Created, LogEntity::Agent, "Created new agent: Neha");
        log.append(
            "Agent User",
            Role::Agent,
            LogAction::Updated,
            LogEntity::Case,
            "Updated case LN-1003 status to RESOLVED",
        );
        admin(&log, LogAction::Assigned, LogEntity::Case, "Assigned case LN-1003");

        assert_eq!(log.filter_by_entity(LogEntity::Case).len(), 2);
        assert_eq!(log.filter_by_user("Agent User").len(), 1);
        assert_eq!(log.filter_by_action(&LogAction::Created).len(), 1);
        assert!(log.filter_by_action(&LogAction::Login).is_empty());

        assert_eq!(log.search("ln-1003", None).len(), 2);
        assert_eq!(log.search("agent user", None).len(), 1);
        assert_eq!(log.search("", Some(LogEntity::Agent)).len(), 1);
        assert_eq!(log.search("neha", Some(LogEntity::Case)).len(), 0);
    }

    #[test]
    fn date_range_is_inclusive() {
        let (log, _) = empty_log();
        let a = admin(&log, LogAction::Created, LogEntity::Agent, "a");
        let b = admin(&log, LogAction::Created, LogEntity::Agent, "b");

        let both = log.filter_by_date_range(a.timestamp, b.timestamp);
        assert_eq!(both.len(), 2);

        let only_a = log.filter_by_date_range(a.timestamp, a.timestamp);
        assert!(only_a.iter().any(|e| e.id == a.id));

        let future = log.filter_by_date_range(
            b.timestamp + Duration::seconds(1),
            Utc::now() + Duration::days(1),
        );
        assert!(future.is_empty());
    }

    #[test]
    fn clear_then_append() {
        let (log, kv) = empty_log();
        admin(&log, LogAction::Created, LogEntity::Agent, "x");
        log.clear();
        assert!(log.list().is_empty());
        assert_eq!(kv.get(ACTIVITY_LOGS_KEY).unwrap().as_deref(), Some("[]"));

        let entry = admin(&log, LogAction::Deleted, LogEntity::Agent, "y");
        assert_eq!(log.list(), vec![entry]);
    }

    #[test]
    fn reopening_reproduces_entries() {
        let kv = Arc::new(MemoryKv::new());
        let log = ActivityLog::open(kv.clone());
        admin(&log, LogAction::Unassigned, LogEntity::Case, "Unassigned case LN-1002");
        log.append(
            "Agent User",
            Role::Agent,
            LogAction::Other("exported".into()),
            LogEntity::Case,
            "Exported case list",
        );

        let reopened = ActivityLog::open(kv);
        assert_eq!(reopened.list(), log.list());

        // New ids keep increasing after a reload.
        let next = admin(&reopened, LogAction::Created, LogEntity::Agent, "z");
        assert!(next.id > log.list()[0].id);
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(ACTIVITY_LOGS_KEY, "{not json").unwrap();

        let log = ActivityLog::open(kv);
        assert!(log.is_empty());
        admin(&log, LogAction::Created, LogEntity::Agent, "works");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn unreadable_storage_starts_empty() {
        let log = ActivityLog::open(Arc::new(BrokenKv {
            reads: true,
            writes: false,
        }));
        assert!(log.is_empty());
    }

    #[test]
    fn write_failure_keeps_in_memory_entry() {
        let log = ActivityLog::open(Arc::new(BrokenKv {
            reads: false,
            writes: true,
        }));
        assert_eq!(log.len(), 3);

        let entry = admin(&log, LogAction::Created, LogEntity::Agent, "kept");
        assert_eq!(log.list()[0], entry);
        log.clear();
        assert!(log.is_empty());
    }
}
