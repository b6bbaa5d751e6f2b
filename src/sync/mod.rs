//! Bootstrap synchronization and lazily loaded dashboard resources.

pub mod auth;
pub mod bootstrap;
pub mod resource;
pub mod resources;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthGate;
pub use bootstrap::{BootstrapPhase, BootstrapSync};
pub use resource::{ResourceKind, ResourceLoader, ResourceState, DEFAULT_DEADLINE};
pub use resources::DashboardResources;
pub use session::SyncSession;
pub use state::DashboardState;
