//! TtlCache implementation

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// A cached value with its absolute expiry
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Longest lifetime an entry can actually get (about 100 years)
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Expiry instant for `ttl` from `now`, capped where the clock cannot reach
fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(MAX_TTL))
        .unwrap_or(now)
}

/// Internal state protected by mutex
struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Snapshot of cache performance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Hits as a percentage of all lookups (0.0 when there were none)
    pub hit_rate: f64,
    /// Entries currently stored, including expired ones not yet swept
    pub size: usize,
}

/// Process-wide key/value store with per-entry expiry
///
/// Concurrent writers to the same key are last-write-wins. A duplicate
/// computation racing on one key is wasted work, never a wrong answer.
pub struct TtlCache<V> {
    default_ttl: Duration,
    inner: Mutex<CacheInner<V>>,
}

impl<V: Clone + Send> TtlCache<V> {
    /// Create a cache whose `set` uses the given time-to-live
    pub fn new(default_ttl: Duration) -> Self {
        debug!(?default_ttl, "TtlCache::new: called");
        Self {
            default_ttl,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Create a cache with a default time-to-live in hours
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(3600)))
    }

    /// The time-to-live applied by `set`
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a live entry
    ///
    /// An entry whose expiry has passed counts as a miss and is evicted.
    pub async fn get(&self, key: &str) -> Option<V> {
        debug!(%key, "TtlCache::get: called");
        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        let state = inner.entries.get(key).map(|entry| entry.is_expired(now));
        match state {
            Some(false) => {
                debug!(%key, "TtlCache::get: hit");
                inner.hits += 1;
                inner.entries.get(key).map(|entry| entry.value.clone())
            }
            Some(true) => {
                debug!(%key, "TtlCache::get: expired, evicting");
                inner.entries.remove(key);
                inner.misses += 1;
                None
            }
            None => {
                debug!(%key, "TtlCache::get: miss");
                inner.misses += 1;
                None
            }
        }
    }

    /// Store a value with the default time-to-live
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl).await;
    }

    /// Store a value that expires after `ttl`
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        debug!(%key, ?ttl, "TtlCache::set_with_ttl: called");
        let expires_at = expiry_after(Instant::now(), ttl);
        let mut inner = self.inner.lock().await;
        inner.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove one key, returning whether it was present
    pub async fn delete(&self, key: &str) -> bool {
        debug!(%key, "TtlCache::delete: called");
        let mut inner = self.inner.lock().await;
        inner.entries.remove(key).is_some()
    }

    /// Drop every entry and reset the statistics
    pub async fn clear(&self) {
        debug!("TtlCache::clear: called");
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    /// Sweep expired entries, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        debug!("TtlCache::cleanup_expired: called");
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.entries.len();
        debug!(removed, "TtlCache::cleanup_expired: swept");
        removed
    }

    /// Current hit/miss statistics
    pub async fn stats(&self) -> CacheStats {
        debug!("TtlCache::stats: called");
        let inner = self.inner.lock().await;
        let total = inner.hits + inner.misses;
        let hit_rate = if total > 0 {
            inner.hits as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            hit_rate,
            size: inner.entries.len(),
        }
    }

    /// Number of stored entries (expired ones included until swept)
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Return the cached value or compute, store and return it
    ///
    /// The lock is not held while `compute` runs. Errors are returned as-is
    /// and nothing is stored for them.
    pub async fn get_or_insert_with<F, Fut, E>(&self, key: &str, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        debug!(%key, "TtlCache::get_or_insert_with: called");
        if let Some(value) = self.get(key).await {
            debug!(%key, "TtlCache::get_or_insert_with: served from cache");
            return Ok(value);
        }

        let value = compute().await?;
        self.set_with_ttl(key, value.clone(), ttl).await;
        Ok(value)
    }
}

impl<V: Clone + Send> Default for TtlCache<V> {
    fn default() -> Self {
        Self::with_ttl_hours(crate::DEFAULT_TTL_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", "v".to_string()).await;

        assert_eq!(cache.get("k").await, Some("v".to_string()));
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_evicted() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", 7u32, Duration::from_millis(20)).await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_overflow() {
        let cache = TtlCache::with_ttl_hours(u64::MAX);
        cache.set("k", 1u8).await;
        cache.set_with_ttl("j", 2u8, Duration::MAX).await;

        assert_eq!(cache.get("k").await, Some(1));
        assert_eq!(cache.get("j").await, Some(2));
        assert_eq!(cache.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_expired() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", 1u8, Duration::ZERO).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1).await;
        cache.set("b", 2).await;
        let _ = cache.get("a").await;

        assert!(cache.delete("a").await);
        assert!(!cache.delete("a").await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_cleanup_expired_counts_removed() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("short-1", 1, Duration::from_millis(10)).await;
        cache.set_with_ttl("short-2", 2, Duration::from_millis(10)).await;
        cache.set("long", 3).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.cleanup_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("long").await, Some(3));
    }

    #[tokio::test]
    async fn test_hit_rate_percentage() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", 1).await;
        let _ = cache.get("k").await;
        let _ = cache.get("k").await;
        let _ = cache.get("k").await;
        let _ = cache.get("missing").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 75.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_get_or_insert_with_computes_once() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<u32, String> = cache
                .get_or_insert_with("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_insert_with_does_not_store_errors() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let result: Result<u32, String> = cache
            .get_or_insert_with("k", Duration::from_secs(60), || async { Err("boom".to_string()) })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    proptest! {
        #[test]
        fn prop_set_then_get_within_ttl(key in "[a-z0-9:]{1,32}", value in any::<i64>()) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
            let got = rt.block_on(async {
                let cache = TtlCache::new(Duration::from_secs(60));
                cache.set(key.clone(), value).await;
                cache.get(&key).await
            });
            prop_assert_eq!(got, Some(value));
        }
    }
}
