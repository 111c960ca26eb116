//! Durable key-value namespace.
//!
//! The data layer only ever needs three operations from its environment:
//! read a string by key, write a string by key, and wipe everything. Two
//! backends are provided: [`MemoryKv`] for tests and throwaway sessions, and
//! [`SqliteKv`] which keeps the namespace in the `kv` table of a [`Database`].

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

/// Storage contract consumed by the activity log and the session.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop one key. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Drop every key in the namespace.
    fn remove_all(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// Key-value namespace stored in SQLite.
///
/// `rusqlite::Connection` is not `Sync`, so the database sits behind a mutex.
pub struct SqliteKv {
    db: Mutex<Database>,
}

impl SqliteKv {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open the default application database.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Database::new()?))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock();
        let value: Option<String> = db
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock();
        db.conn().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock();
        db.conn().execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        let db = self.db.lock();
        let removed = db.conn().execute("DELETE FROM kv", [])?;
        tracing::debug!(removed, "cleared key-value namespace");
        Ok(())
    }
}
