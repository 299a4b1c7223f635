//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;

/// A raw cache entry as held by the storage backend.
#[derive(Debug, Clone)]
pub struct StoredEntry {
  /// Serialized entry payload
  pub data: Vec<u8>,
  /// Instant after which the entry must be treated as a miss
  pub expires_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Store a payload under `key`, replacing any previous entry.
  fn put(&self, key: &str, data: &[u8], expires_at: DateTime<Utc>) -> Result<()>;

  /// Get the entry for `key`, expired or not. Expiry is the caller's concern.
  fn get(&self, key: &str) -> Result<Option<StoredEntry>>;
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the storage at `path`, or at the default location under the
  /// platform data directory when `path` is `None`.
  pub fn open(path: Option<&std::path::Path>) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open a transient in-memory storage.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
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
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("repostats").join("cache.db"))
  }

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

/// Schema for the cache table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stats_cache (
    cache_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    expires_at TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl CacheStorage for SqliteStorage {
  fn put(&self, key: &str, data: &[u8], expires_at: DateTime<Utc>) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO stats_cache (cache_key, data, expires_at, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key, data, expires_at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT data, expires_at FROM stats_cache WHERE cache_key = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(Vec<u8>, String)> = stmt
      .query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
      .ok();

    match row {
      Some((data, expires_at)) => {
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|e| eyre!("Failed to parse expiry '{}': {}", expires_at, e))?;
        Ok(Some(StoredEntry { data, expires_at }))
      }
      None => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn put_then_get_returns_entry() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let expires = Utc::now() + Duration::hours(1);

    storage
      .put("github:commits:octo:demo:2026-08-28", b"[1,2]", expires)
      .unwrap();

    let entry = storage
      .get("github:commits:octo:demo:2026-08-28")
      .unwrap()
      .unwrap();
    assert_eq!(entry.data, b"[1,2]");
  }

  #[test]
  fn get_unknown_key_is_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.get("github:commits:octo:demo:2026-08-28").unwrap().is_none());
  }

  #[test]
  fn put_replaces_existing_entry() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let expires = Utc::now() + Duration::hours(1);

    storage.put("k", b"old", expires).unwrap();
    storage.put("k", b"new", expires).unwrap();

    let entry = storage.get("k").unwrap().unwrap();
    assert_eq!(entry.data, b"new");
  }
}
