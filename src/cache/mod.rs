//! Cache Module
//!
//! Provides the in-process page cache with TTL expiration and prefix
//! invalidation, plus the key scheme used by page handlers.

mod entry;
pub mod keys;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;
