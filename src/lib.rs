//! Bootstrap synchronization and incremental caching for the school
//! operations dashboard.
//!
//! The crate hydrates dashboard state from a locally persisted snapshot,
//! revalidates it against the server with conditional requests, reconciles
//! fresh data without discarding identity on no-op updates, and lazily loads
//! per-view datasets as the user navigates.

pub mod api;
pub mod cache;
pub mod config;
pub mod sync;
