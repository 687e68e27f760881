//! Cache Store Module
//!
//! Keyed, time-bounded storage for remote listings. Expiry is checked lazily
//! at read time; nothing sweeps in the background.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::stats::Lookup;
use crate::cache::{CacheEntry, CacheStats, LISTING_TTL};

// == TTL Cache ==
/// Listing cache with a fixed time-to-live and prefix invalidation.
#[derive(Debug)]
pub struct TtlCache<T> {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Lookup statistics
    stats: CacheStats,
    /// Freshness window
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates an empty cache using the fixed listing TTL.
    pub fn new() -> Self {
        Self::with_ttl(LISTING_TTL)
    }

    /// Creates an empty cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            ttl,
        }
    }

    /// The freshness window applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Put ==
    /// Stores a payload, unconditionally replacing any previous entry.
    pub fn put(&mut self, key: impl Into<String>, payload: T) {
        let key = key.into();
        self.entries
            .insert(key.clone(), CacheEntry::new(key, payload));
    }

    // == Get ==
    /// Returns the entry for `key` if it is still fresh.
    ///
    /// A stale entry is removed and reported as a miss so the caller re-fetches.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`TtlCache::get`] with an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<CacheEntry<T>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now, self.ttl),
            None => {
                self.stats.record(Lookup::Absent);
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.record(Lookup::Stale);
            debug!(key, "listing cache entry expired");
            return None;
        }

        self.stats.record(Lookup::Fresh);
        self.entries.get(key).cloned()
    }

    // == Invalidate ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();

        self.stats.record_invalidations(removed);
        if removed > 0 {
            debug!(prefix, removed, "listing cache invalidated");
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Number of stored entries, fresh or not yet checked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_cache_new_uses_listing_ttl() {
        let cache: TtlCache<Vec<String>> = TtlCache::new();
        assert_eq!(cache.ttl(), Duration::from_secs(300));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = TtlCache::new();
        cache.put("list:root|", vec!["a".to_string()]);

        let entry = cache.get("list:root|").unwrap();
        assert_eq!(entry.payload, vec!["a".to_string()]);
        assert_eq!(entry.key, "list:root|");
    }

    #[test]
    fn test_get_missing() {
        let mut cache: TtlCache<u32> = TtlCache::new();
        assert!(cache.get("absent").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = TtlCache::new();
        cache.put("k", 1);
        cache.put("k", 2);

        assert_eq!(cache.get("k").unwrap().payload, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_not_served_after_ttl() {
        let mut cache = TtlCache::new();
        cache.put("k", "v".to_string());
        let later = Instant::now() + LISTING_TTL;

        assert!(cache.get_at("k", later).is_none());
        assert!(cache.is_empty(), "stale entry is dropped on read");

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_short_ttl_expires_in_real_time() {
        let mut cache = TtlCache::with_ttl(Duration::from_millis(50));
        cache.put("k", 7);
        assert!(cache.get("k").is_some());

        sleep(Duration::from_millis(80));

        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_put_refreshes_insertion_time() {
        let mut cache = TtlCache::with_ttl(Duration::from_millis(60));
        cache.put("k", 1);
        sleep(Duration::from_millis(40));
        cache.put("k", 2);
        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("k").unwrap().payload, 2);
    }

    #[test]
    fn test_invalidate_prefix() {
        let mut cache = TtlCache::new();
        cache.put("list:abc|q=", 1);
        cache.put("list:abc|q=informe", 2);
        cache.put("list:abcd|q=", 3);
        cache.put("list:xyz|q=", 4);

        let removed = cache.invalidate("list:abc|");

        assert_eq!(removed, 2);
        assert!(cache.get("list:abc|q=").is_none());
        assert!(cache.get("list:abcd|q=").is_some());
        assert!(cache.get("list:xyz|q=").is_some());
        assert_eq!(cache.stats().invalidations, 2);
    }

    #[test]
    fn test_invalidate_nothing() {
        let mut cache = TtlCache::new();
        cache.put("k", 1);
        assert_eq!(cache.invalidate("other"), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_hits_and_misses() {
        let mut cache = TtlCache::new();
        cache.put("k", 1);
        cache.get("k");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
