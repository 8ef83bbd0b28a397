//! Expiring token cache.
//!
//! The access token is short-lived and must never be trusted past its
//! declared lifetime. The cache enforces expiry itself: a [`TokenCache::get`]
//! on an expired entry behaves like a miss, so callers never re-validate
//! TTLs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// The fixed cache key under which the access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// An expiring key-value cache for short-lived tokens.
///
/// Implementations must treat entries past their TTL as absent.
pub trait TokenCache: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Inserts or replaces the value for `key` with the given TTL.
    fn put(&self, key: &str, value: &str, ttl: Duration);

    /// Removes the value for `key`, if present.
    fn remove(&self, key: &str);
}

/// A cache entry with its expiry (monotonic clock).
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`TokenCache`] implementation.
///
/// Expired entries are evicted lazily on access.
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryTokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenCache for MemoryTokenCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        debug!(key = %key, ttl_secs = ttl.as_secs(), "cached token");
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            debug!(key = %key, "removed cached token");
        }
    }
}
