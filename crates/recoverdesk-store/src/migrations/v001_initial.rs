//! v001 -- Initial schema creation.
//!
//! A single `kv` table holding the durable key-value namespace
//! (`activityLogs`, `user`, `token`).

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,             -- opaque string, usually JSON
    updated_at TEXT NOT NULL              -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
