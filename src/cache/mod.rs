//! Local persistence and reconciliation.
//!
//! This module provides:
//! - Key/value storage backends (SQLite, in-memory, no-op)
//! - A typed, tenant-scoped store for the bootstrap snapshot and its
//!   freshness token, which never fails outward
//! - Identity-based reconciliation that preserves `Arc` identity on no-op
//!   updates

pub mod reconcile;
mod storage;
mod store;
mod traits;

pub use reconcile::{reconcile_list, replace_if_different, upsert_by_id};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage, SqliteStorage};
pub use store::{BootstrapCache, FRESHNESS_TOKEN_KEY, SNAPSHOT_KEY};
pub use traits::Identified;
