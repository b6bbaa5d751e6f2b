use crate::api::TenantContext;

/// Whether remote sync may run at all.
///
/// Without a credential the dashboard runs in demo/local mode: no request is
/// issued and every resource settles immediately with empty data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
  Open,
  Closed,
}

impl AuthGate {
  pub fn from_context(context: &TenantContext) -> Self {
    if context.has_credential() {
      AuthGate::Open
    } else {
      AuthGate::Closed
    }
  }

  pub fn allows_remote(self) -> bool {
    self == AuthGate::Open
  }
}
