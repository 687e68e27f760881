//! Cache Entry Module
//!
//! Defines a cached listing together with the moment it was stored.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A cached payload stamped with its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Composite key the payload was stored under
    pub key: String,
    /// The cached payload
    pub payload: T,
    /// When the payload was stored
    pub inserted_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(key: String, payload: T) -> Self {
        Self {
            key,
            payload,
            inserted_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed between insertion and `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks whether the entry may no longer be served at `now`.
    ///
    /// An entry is fresh only while `now - inserted_at < ttl`; once the full
    /// TTL has elapsed it is expired.
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        self.age_at(now) >= ttl
    }

    /// Remaining freshness at `now`, zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.age_at(now))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_entry_fresh_on_creation() {
        let entry = CacheEntry::new("folder:root".to_string(), vec![1, 2, 3]);

        assert_eq!(entry.key, "folder:root");
        assert_eq!(entry.payload, vec![1, 2, 3]);
        assert!(!entry.is_expired_at(Instant::now(), TTL));
    }

    #[test]
    fn test_entry_expires_at_boundary() {
        let entry = CacheEntry::new("k".to_string(), ());
        let boundary = entry.inserted_at + TTL;

        assert!(!entry.is_expired_at(boundary - Duration::from_millis(1), TTL));
        assert!(entry.is_expired_at(boundary, TTL));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("k".to_string(), ());
        let later = entry.inserted_at + Duration::from_secs(60);

        assert_eq!(entry.ttl_remaining_at(later, TTL), Duration::from_secs(240));
        assert_eq!(entry.ttl_remaining_at(later + TTL, TTL), Duration::ZERO);
    }
}
