//! # recoverdesk-store
//!
//! Data layer for the Recoverdesk collections back office.
//!
//! Case and agent records live in an in-memory [`EntityStore`] that keeps
//! assignment data consistent across both tables. User actions are recorded
//! in an append-only [`ActivityLog`] persisted through a [`KeyValueStore`],
//! which is either process memory or a small SQLite database. Query helpers
//! ([`CaseService`], [`AgentService`]) and the action layer ([`Desk`]) sit on
//! top.

pub mod activity;
pub mod agents;
pub mod cases;
pub mod dashboard;
pub mod database;
pub mod desk;
pub mod entities;
pub mod kv;
pub mod migrations;
pub mod mock;
pub mod models;
pub mod session;

mod error;

pub use activity::ActivityLog;
pub use agents::AgentService;
pub use cases::{CaseService, CaseSort};
pub use database::Database;
pub use desk::Desk;
pub use entities::EntityStore;
pub use error::StoreError;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use mock::MockConfig;
pub use models::*;
pub use session::Session;
