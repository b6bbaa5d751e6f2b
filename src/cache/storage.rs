//! Key/value storage backends that survive process restarts.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trait for cache storage backends.
///
/// Backends report failures as errors; callers that must never fail
/// (the bootstrap cache) translate them into misses and dropped writes.
pub trait CacheStorage: Send + Sync {
  /// Get the value stored under `key`.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn put(&self, key: &str, value: &str) -> Result<()>;

  /// Store several entries atomically: either all land or none do.
  fn put_many(&self, entries: &[(&str, &str)]) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn put(&self, _key: &str, _value: &str) -> Result<()> {
    Ok(()) // Discard
  }

  fn put_many(&self, _entries: &[(&str, &str)]) -> Result<()> {
    Ok(()) // Discard
  }
}

/// Process-local storage, lost on exit.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn put(&self, key: &str, value: &str) -> Result<()> {
    self.put_many(&[(key, value)])
  }

  fn put_many(&self, new_entries: &[(&str, &str)]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    for (key, value) in new_entries {
      entries.insert(key.to_string(), value.to_string());
    }
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the key/value table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Create a new SQLite storage at `path`, creating parent directories.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// In-memory database, mostly useful for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("schooldash").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

impl CacheStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT value FROM kv_cache WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache key {}: {}", key, e))
  }

  fn put(&self, key: &str, value: &str) -> Result<()> {
    self.put_many(&[(key, value)])
  }

  fn put_many(&self, entries: &[(&str, &str)]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let tx = conn
      .unchecked_transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    for (key, value) in entries {
      tx.execute(
        "INSERT OR REPLACE INTO kv_cache (key, value, written_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write cache key {}: {}", key, e))?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_noop_always_misses() {
    let storage = NoopStorage;
    storage.put("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
  }

  #[test]
  fn test_memory_put_get() {
    let storage = MemoryStorage::new();
    storage.put_many(&[("a", "1"), ("b", "2")]).unwrap();
    assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    assert_eq!(storage.get("c").unwrap(), None);
  }

  #[test]
  fn test_sqlite_overwrites_value() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put("k", "first").unwrap();
    storage.put("k", "second").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
  }

  #[test]
  fn test_sqlite_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cache.db");

    {
      let storage = SqliteStorage::open_at(&path).unwrap();
      storage
        .put_many(&[("snapshot", "{}"), ("token", "abc")])
        .unwrap();
    }

    let reopened = SqliteStorage::open_at(&path).unwrap();
    assert_eq!(reopened.get("snapshot").unwrap().as_deref(), Some("{}"));
    assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));
  }
}
