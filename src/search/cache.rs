//! Bounded, time-expiring in-process cache for search responses.
//!
//! Entries expire lazily: an expired entry is removed on the lookup that finds
//! it. When an insert pushes the table over capacity the single oldest entry
//! (by insertion time) is evicted with a linear scan, which is fine for the
//! small capacities this is configured with.
//!
//! The cache is strictly an optimization. A poisoned lock degrades to a miss
//! on lookup and a no-op on insert.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

/// Source of the current instant, injectable so expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.start + offset
    }
}

/// Whether a response came from the cache. Rendered as the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns the entry for `key` if it is younger than the TTL.
    /// An expired entry is removed before reporting the miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.lookup(key);

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("search_cache_hits_total").increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("search_cache_misses_total").increment(1);
        }

        value
    }

    fn lookup(&self, key: &K) -> Option<V> {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Search cache lock poisoned, treating lookup as a miss");
            return None;
        };

        let now = self.clock.now();
        let fresh = entries
            .get(key)
            .map(|entry| now.saturating_duration_since(entry.inserted_at) < self.ttl)?;

        if fresh {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    /// Inserts or overwrites `key`, then evicts the oldest entry if over capacity.
    pub fn put(&self, key: K, value: V) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Search cache lock poisoned, skipping store");
            return;
        };

        entries.insert(
            key,
            Entry {
                value,
                inserted_at: self.clock.now(),
            },
        );

        if entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());

            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn evict(&self, key: &K) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Drops every entry and returns how many were resident.
    pub fn clear(&self) -> usize {
        self.entries
            .lock()
            .map(|mut entries| {
                let count = entries.len();
                entries.clear();
                count
            })
            .unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            ttl_seconds: self.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn cache_with_clock(capacity: usize) -> (TtlCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(TTL, capacity, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = cache_with_clock(10);
        cache.put("web".to_string(), 1);

        clock.advance(TTL - Duration::from_secs(1));
        assert_eq!(cache.get(&"web".to_string()), Some(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_expired_entry_is_removed_on_lookup() {
        let (cache, clock) = cache_with_clock(10);
        cache.put("web".to_string(), 1);

        // Exactly TTL old is already stale.
        clock.advance(TTL);
        assert!(cache.contains(&"web".to_string()));
        assert_eq!(cache.get(&"web".to_string()), None);
        assert!(!cache.contains(&"web".to_string()));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock(10);
        cache.put("web".to_string(), 1);
        clock.advance(Duration::from_secs(200));
        cache.put("web".to_string(), 2);
        clock.advance(Duration::from_secs(200));

        assert_eq!(cache.get(&"web".to_string()), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_bound_evicts_oldest() {
        let (cache, clock) = cache_with_clock(100);

        for i in 0..150u32 {
            cache.put(format!("query-{i}"), i);
            clock.advance(Duration::from_millis(1));
            assert!(cache.len() <= 100);
        }

        assert_eq!(cache.len(), 100);
        assert!(!cache.contains(&"query-0".to_string()));
        assert!(!cache.contains(&"query-49".to_string()));
        assert!(cache.contains(&"query-50".to_string()));
        assert!(cache.contains(&"query-149".to_string()));
        assert_eq!(cache.stats().evictions, 50);
    }

    #[test]
    fn test_evict_and_clear() {
        let (cache, _) = cache_with_clock(10);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        assert!(cache.evict(&"a".to_string()));
        assert!(!cache.evict(&"a".to_string()));
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
    }
}
