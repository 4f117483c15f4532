//! Short-lived memoization of provider results.
//!
//! Entries are never expired in the background. A read compares the entry's
//! age against the freshness window and treats anything at or past the
//! window as absent. Writes to the same key are last-write-wins.

use std::time::Duration;

use dashmap::DashMap;
use log::debug;
use tokio::time::Instant;

/// Default freshness window for cached quotes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Time-boxed cache keyed by request identity.
///
/// Backed by a sharded map, so operations on different keys do not contend.
/// When `max_entries` is set, inserting a new key into a full cache drops
/// stale entries first and then the oldest remaining entry.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: None,
        }
    }

    /// Bound the number of entries kept.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if it is still fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(Instant::now(), self.ttl) {
            debug!("Cache hit for '{}'", key);
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store `value` under `key`, stamped with the current instant.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = Instant::now();

        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.make_room(now, max);
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry past the freshness window. Returns how many were removed.
    pub fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, now: Instant, max: usize) {
        self.entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        if self.entries.len() < max {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().stored_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
