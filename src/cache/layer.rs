//! Day-bucketed cache layer that orchestrates caching with upstream fetching.
//!
//! Two staleness tiers apply to every entry: the calendar day baked into the
//! key (a new UTC day always misses) and a fixed TTL (an entry can expire
//! mid-day and be refetched under the same key). Both are intentional.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use color_eyre::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use super::storage::CacheStorage;

/// Result of a cache-or-fetch operation.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
  /// The cached or freshly fetched data
  pub data: T,
  /// ISO-8601 instant the data was originally fetched from upstream
  pub fetched_at: String,
}

/// Stored envelope wrapping a result set with its fetch timestamp.
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
  data: T,
  fetched_at: String,
}

/// Current instant in the upstream's ISO-8601 millisecond format, so that
/// fetch timestamps stay comparable as plain strings.
pub fn iso_now() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Cache layer over a [`CacheStorage`] backend.
///
/// Storage failures never surface: a failed read is a miss, a failed write
/// is logged and dropped. The cache only ever improves latency, it is not
/// load-bearing for correctness.
pub struct DayCache<S: CacheStorage> {
  storage: Arc<S>,
  namespace: String,
  ttl: Duration,
}

impl<S: CacheStorage> DayCache<S> {
  pub fn new(storage: S, namespace: impl Into<String>, ttl_secs: u64) -> Self {
    Self {
      storage: Arc::new(storage),
      namespace: namespace.into(),
      ttl: Duration::seconds(ttl_secs as i64),
    }
  }

  fn full_key(&self, key: &str) -> String {
    format!("{}:{}", self.namespace, key)
  }

  /// Whether a live entry exists for `key`. Used only to report cache
  /// provenance in responses, never for control flow.
  pub fn exists(&self, key: &str) -> bool {
    self.entry_at(key, Utc::now()).is_some()
  }

  fn entry_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<u8>> {
    match self.storage.get(&self.full_key(key)) {
      Ok(Some(entry)) if entry.expires_at > now => Some(entry.data),
      Ok(_) => None,
      Err(e) => {
        tracing::debug!(key, "cache read failed, treating as miss: {}", e);
        None
      }
    }
  }

  fn lookup_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<Fetched<T>> {
    let data = self.entry_at(key, now)?;
    // A malformed stored value is also just a miss.
    let envelope: Envelope<T> = serde_json::from_slice(&data).ok()?;
    Some(Fetched {
      data: envelope.data,
      fetched_at: envelope.fetched_at,
    })
  }

  /// Best-effort write; failures are logged and do not raise.
  pub fn store<T: Serialize>(&self, key: &str, data: &T, fetched_at: &str) {
    let envelope = Envelope {
      data,
      fetched_at: fetched_at.to_string(),
    };
    let bytes = match serde_json::to_vec(&envelope) {
      Ok(b) => b,
      Err(e) => {
        tracing::warn!(key, "failed to serialize cache entry: {}", e);
        return;
      }
    };

    let expires_at = Utc::now() + self.ttl;
    if let Err(e) = self.storage.put(&self.full_key(key), &bytes, expires_at) {
      tracing::warn!(key, "failed to write cache entry: {}", e);
    }
  }

  /// Return the live entry for `key`, or run `fetcher` and cache its result.
  ///
  /// Fetcher errors propagate; storage errors do not.
  pub async fn fetch_with<T, F, Fut>(&self, key: &str, fetcher: F) -> Result<Fetched<T>>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(hit) = self.lookup_at(key, Utc::now()) {
      tracing::debug!(key, "cache hit");
      return Ok(hit);
    }

    let data = fetcher().await?;
    let fetched_at = iso_now();
    self.store(key, &data, &fetched_at);

    Ok(Fetched { data, fetched_at })
  }
}

impl<S: CacheStorage> Clone for DayCache<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      namespace: self.namespace.clone(),
      ttl: self.ttl,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::SqliteStorage;
  use std::sync::atomic::{AtomicU32, Ordering};

  fn cache() -> DayCache<SqliteStorage> {
    DayCache::new(SqliteStorage::open_in_memory().unwrap(), "test", 3600)
  }

  #[test]
  fn lookup_within_ttl_returns_value() {
    let cache = cache();
    cache.store("commits:octo:demo:2026-08-28", &vec![1, 2, 3], "2026-08-28T10:00:00.000Z");

    let hit: Fetched<Vec<i32>> = cache
      .lookup_at("commits:octo:demo:2026-08-28", Utc::now())
      .unwrap();
    assert_eq!(hit.data, vec![1, 2, 3]);
    assert_eq!(hit.fetched_at, "2026-08-28T10:00:00.000Z");
  }

  #[test]
  fn lookup_past_ttl_misses() {
    let cache = cache();
    cache.store("k", &vec![1], "2026-08-28T10:00:00.000Z");

    let later = Utc::now() + Duration::seconds(3601);
    assert!(cache.lookup_at::<Vec<i32>>("k", later).is_none());
  }

  #[test]
  fn exists_reports_live_entries_only() {
    let cache = DayCache::new(SqliteStorage::open_in_memory().unwrap(), "test", 0);
    assert!(!cache.exists("k"));

    cache.store("k", &1, "2026-08-28T10:00:00.000Z");
    // TTL of zero expires immediately
    assert!(!cache.exists("k"));
  }

  #[tokio::test]
  async fn fetch_with_only_fetches_on_miss() {
    let cache = cache();
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..2 {
      let calls = Arc::clone(&calls);
      let got: Fetched<Vec<i32>> = cache
        .fetch_with("k", move || async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(vec![7])
        })
        .await
        .unwrap();
      assert_eq!(got.data, vec![7]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn fetch_with_propagates_fetcher_errors() {
    let cache = cache();
    let result: Result<Fetched<Vec<i32>>> = cache
      .fetch_with("k", || async { Err(color_eyre::eyre::eyre!("boom")) })
      .await;
    assert!(result.is_err());
  }
}
