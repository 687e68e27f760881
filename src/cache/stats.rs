//! Listing cache counters.

use serde::Serialize;

/// Outcome of a single cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// A fresh entry was served
    Fresh,
    /// No entry under the key
    Absent,
    /// The entry had outlived its TTL and was dropped
    Stale,
}

/// Counters reported by `GET /cache/stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Absent and stale lookups; both make the caller re-fetch
    pub misses: u64,
    pub expirations: u64,
    /// Entries dropped by prefix invalidation
    pub invalidations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub(crate) fn record(&mut self, lookup: Lookup) {
        match lookup {
            Lookup::Fresh => self.hits += 1,
            Lookup::Absent => self.misses += 1,
            Lookup::Stale => {
                self.expirations += 1;
                self.misses += 1;
            }
        }
    }

    pub(crate) fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    /// Copy of the counters with the current entry count filled in.
    pub(crate) fn snapshot(&self, entries: usize) -> Self {
        Self {
            total_entries: entries,
            ..self.clone()
        }
    }

    /// Share of lookups served from the cache, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_lookup_counts_as_miss_and_expiration() {
        let mut stats = CacheStats::default();
        stats.record(Lookup::Stale);
        stats.record(Lookup::Absent);

        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_hit_rate_over_lookups() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        for lookup in [Lookup::Fresh, Lookup::Fresh, Lookup::Fresh, Lookup::Stale] {
            stats.record(lookup);
        }
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_snapshot_sets_entry_count() {
        let mut stats = CacheStats::default();
        stats.record_invalidations(3);
        stats.record_invalidations(0);

        let snapshot = stats.snapshot(7);
        assert_eq!(snapshot.total_entries, 7);
        assert_eq!(snapshot.invalidations, 3);
        assert_eq!(stats.total_entries, 0);
    }
}
