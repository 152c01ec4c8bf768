//! Topic-keyed cache with lazy expiry.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::key::CacheKey;
use crate::observability::metrics;

/// Default time-to-live: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

fn is_expired(created_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(created_at) > ttl
}

/// A thread-safe cache keyed by normalized topic.
///
/// Entries older than the TTL are invisible to `get` and are removed the
/// first time they are looked up, or by `sweep`. Clones share storage.
#[derive(Clone)]
pub struct ExpiringCache<V> {
    name: &'static str,
    entries: Arc<DashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ExpiringCache<V> {
    /// Create an empty cache on the system clock.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            entries: Arc::new(DashMap::new()),
            ttl,
            clock,
        }
    }

    /// Value stored for `topic`, if present and within the TTL.
    ///
    /// Hits only take the shard read lock. An expired entry is removed with
    /// `remove_if`, which re-checks the age under the write lock, so a
    /// concurrent `set` on the same key is never lost.
    pub fn get(&self, topic: &str) -> Option<V> {
        let key = CacheKey::from_topic(topic);
        let now = self.clock.now();
        let ttl = self.ttl;

        let lookup = self.entries.get(&key).map(|entry| {
            (!is_expired(entry.created_at, now, ttl)).then(|| entry.value.clone())
        });

        let value = match lookup {
            Some(Some(value)) => Some(value),
            Some(None) => {
                let evicted = self
                    .entries
                    .remove_if(&key, |_, entry| is_expired(entry.created_at, now, ttl));
                if evicted.is_some() {
                    tracing::debug!(cache = self.name, key = %key, "Evicted expired entry");
                    metrics::record_cache_size(self.name, self.entries.len());
                }
                None
            }
            None => None,
        };

        metrics::record_cache_lookup(self.name, value.is_some());
        value
    }

    /// Store `value` for `topic`, replacing any previous entry.
    pub fn set(&self, topic: &str, value: V) {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
        };
        self.entries.insert(CacheKey::from_topic(topic), entry);
        metrics::record_cache_size(self.name, self.entries.len());
    }

    /// Remove every expired entry and return how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = !is_expired(entry.created_at, now, ttl);
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            tracing::info!(cache = self.name, removed, "Swept expired entries");
            metrics::record_cache_size(self.name, self.entries.len());
        }
        removed
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entries.clear();
        metrics::record_cache_size(self.name, 0);
    }

    /// Entry count, including expired entries not yet removed.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
