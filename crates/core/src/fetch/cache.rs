//! In-memory TTL cache for fetched JSON objects, keyed by URL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::JsonObject;

struct CacheEntry {
    value: JsonObject,
    inserted_at: Instant,
    /// TTL the entry was stored with; only used for eviction.
    retain_for: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= self.retain_for
    }
}

/// Bounded response cache.
///
/// Freshness is decided by the reader: [`get`](Self::get) returns an entry
/// only if it is younger than the TTL passed in, so a short-TTL caller never
/// sees a response stored by a long-TTL one past its own limit. When full,
/// entries past their insertion TTL are dropped first, then the oldest.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl ResponseCache {
    /// Create a cache holding at most `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Get the entry for `url` if it is younger than `ttl`.
    pub async fn get(&self, url: &str, ttl: Duration) -> Option<JsonObject> {
        let entries = self.entries.read().await;
        entries
            .get(url)
            .filter(|e| e.inserted_at.elapsed() < ttl)
            .map(|e| e.value.clone())
    }

    /// Store `value` for `url`. A zero TTL stores nothing.
    pub async fn insert(&self, url: &str, value: JsonObject, ttl: Duration) {
        if ttl.is_zero() || self.max_entries == 0 {
            return;
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(url) && entries.len() >= self.max_entries {
            entries.retain(|_, e| !e.is_expired(now));
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(key) = oldest {
                    entries.remove(&key);
                }
            }
        }

        entries.insert(
            url.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                retain_for: ttl,
            },
        );
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
