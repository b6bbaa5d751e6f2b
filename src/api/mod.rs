//! Boundary with the dashboard HTTP API.

mod cache;
pub mod api_types;
pub mod client;
pub mod context;
pub mod error;
pub mod types;

pub use client::{BootstrapFetch, DashboardApi, DashboardClient};
pub use context::{Credential, TenantContext, TenantId};
pub use error::ApiError;
