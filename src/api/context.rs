//! Request scoping: which school a call belongs to and which credential, if
//! any, it carries.
//!
//! A `TenantContext` is built once from configuration and handed to the
//! client and cache at construction time. Nothing reads tenant identity from
//! ambient state.

use std::fmt;

/// Header used to scope unauthenticated requests to a tenant.
pub const TENANT_HEADER: &str = "x-tenant";

/// Identifier of a school (tenant), normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
  pub fn new(id: &str) -> Self {
    Self(id.trim().to_lowercase())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TenantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// An API bearer token. Only its presence matters to the sync layer.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  /// Wrap a raw token. Blank tokens count as no credential.
  pub fn new(token: impl Into<String>) -> Option<Self> {
    let token = token.into();
    let trimmed = token.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(Self(trimmed.to_string()))
    }
  }

  /// Value for the `Authorization` header.
  pub fn bearer(&self) -> String {
    format!("Bearer {}", self.0)
  }
}

// Never print the token itself.
impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(<redacted>)")
  }
}

/// Tenant and credential threaded through every outgoing request.
#[derive(Debug, Clone)]
pub struct TenantContext {
  tenant: TenantId,
  credential: Option<Credential>,
}

impl TenantContext {
  pub fn new(tenant: TenantId, credential: Option<Credential>) -> Self {
    Self { tenant, credential }
  }

  pub fn tenant(&self) -> &TenantId {
    &self.tenant
  }

  pub fn credential(&self) -> Option<&Credential> {
    self.credential.as_ref()
  }

  pub fn has_credential(&self) -> bool {
    self.credential.is_some()
  }
}
