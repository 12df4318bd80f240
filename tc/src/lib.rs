//! TripCache - in-memory TTL cache
//!
//! Stores values with an absolute expiry and tracks hit/miss statistics.
//! Expired entries are evicted lazily on `get` and in bulk by an explicit
//! `cleanup_expired` sweep; there is no background thread.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tripcache::{TtlCache, cache_key};
//!
//! let cache = TtlCache::new(Duration::from_secs(3600));
//! let key = cache_key("flights", &("Lahore", "Dubai", "2025-12-12", "2"))?;
//! cache.set(key.clone(), serde_json::json!({"flights": []})).await;
//! assert!(cache.get(&key).await.is_some());
//! ```

mod cache;
mod key;

pub use cache::{CacheStats, TtlCache};
pub use key::cache_key;

/// Default time-to-live for cached entries (24 hours)
pub const DEFAULT_TTL_HOURS: u64 = 24;
