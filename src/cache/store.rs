//! Persisted bootstrap snapshot and its freshness token.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::types::BootstrapSnapshot;
use crate::api::TenantId;

use super::storage::CacheStorage;

/// Key holding the JSON-serialized snapshot.
pub const SNAPSHOT_KEY: &str = "bootstrap-cache";
/// Key holding the server-issued ETag for the snapshot.
pub const FRESHNESS_TOKEN_KEY: &str = "bootstrap-freshness-token";

/// Typed access to the bootstrap snapshot for one tenant.
///
/// Reads never fail: storage errors and undecodable entries are cache
/// misses. Writes never fail either: errors are logged and the write is
/// dropped. There is no expiry, a snapshot of any age is usable until a
/// revalidation replaces it.
#[derive(Clone)]
pub struct BootstrapCache {
  storage: Arc<dyn CacheStorage>,
  namespace: String,
}

impl BootstrapCache {
  /// Cache for `tenant`. Keys are prefixed with the tenant id so two schools
  /// sharing a profile never hydrate from each other's snapshot.
  pub fn new(storage: Arc<dyn CacheStorage>, tenant: &TenantId) -> Self {
    Self {
      storage,
      namespace: tenant.as_str().to_string(),
    }
  }

  fn key(&self, name: &str) -> String {
    format!("{}:{}", self.namespace, name)
  }

  pub fn read(&self) -> Option<BootstrapSnapshot> {
    let raw = match self.storage.get(&self.key(SNAPSHOT_KEY)) {
      Ok(raw) => raw?,
      Err(e) => {
        warn!(error = %e, "bootstrap cache unavailable, treating as miss");
        return None;
      }
    };

    match serde_json::from_str(&raw) {
      Ok(snapshot) => Some(snapshot),
      Err(e) => {
        warn!(error = %e, "discarding undecodable bootstrap snapshot");
        None
      }
    }
  }

  pub fn read_freshness_token(&self) -> Option<String> {
    match self.storage.get(&self.key(FRESHNESS_TOKEN_KEY)) {
      Ok(token) => token,
      Err(e) => {
        warn!(error = %e, "freshness token unavailable");
        None
      }
    }
  }

  /// Store `snapshot`. Returns whether it was persisted.
  pub fn write(&self, snapshot: &BootstrapSnapshot) -> bool {
    let Some(raw) = encode(snapshot) else {
      return false;
    };
    self.persist(&[(self.key(SNAPSHOT_KEY).as_str(), raw.as_str())])
  }

  /// Store a freshness token. Callers must only do this together with, or
  /// after, the snapshot it describes; prefer [`BootstrapCache::commit`].
  pub fn write_freshness_token(&self, token: &str) -> bool {
    self.persist(&[(self.key(FRESHNESS_TOKEN_KEY).as_str(), token)])
  }

  /// Store `snapshot` and its `token` in one atomic write, so the pair can
  /// never be observed half-updated.
  pub fn commit(&self, snapshot: &BootstrapSnapshot, token: &str) -> bool {
    let Some(raw) = encode(snapshot) else {
      return false;
    };
    let snapshot_key = self.key(SNAPSHOT_KEY);
    let token_key = self.key(FRESHNESS_TOKEN_KEY);
    let persisted = self.persist(&[
      (snapshot_key.as_str(), raw.as_str()),
      (token_key.as_str(), token),
    ]);
    if persisted {
      debug!(namespace = %self.namespace, token, "bootstrap snapshot committed");
    }
    persisted
  }

  fn persist(&self, entries: &[(&str, &str)]) -> bool {
    match self.storage.put_many(entries) {
      Ok(()) => true,
      Err(e) => {
        warn!(error = %e, "dropping bootstrap cache write");
        false
      }
    }
  }
}

fn encode(snapshot: &BootstrapSnapshot) -> Option<String> {
  match serde_json::to_string(snapshot) {
    Ok(raw) => Some(raw),
    Err(e) => {
      warn!(error = %e, "failed to encode bootstrap snapshot");
      None
    }
  }
}
