//! Cache Module
//!
//! Time-bounded cache for remote folder and file listings.

mod entry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// How long a listing may be served before it must be re-fetched.
pub const LISTING_TTL: Duration = Duration::from_secs(5 * 60);
