//! Cache Store Module
//!
//! Time-bounded page cache: a single `RwLock` over a `HashMap` with lazy
//! expiry on read and prefix invalidation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::tasks::Sweep;

// == Cache Store ==
/// Shared cache of rendered artifacts, keyed by hierarchical strings.
///
/// Reads take the shared lock; every mutation takes the exclusive lock. No
/// operation performs I/O while holding it.
pub struct CacheStore<V = String> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Performance statistics
    stats: StatsCounters,
    /// Bumped by every delete, under the write lock
    generation: AtomicU64,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
            generation: AtomicU64::new(0),
            clock,
        }
    }

    // == Get ==
    /// Returns the value for `key` if a non-expired entry exists.
    ///
    /// Expired entries read as absent; they stay in memory until the sweeper
    /// or an overwrite removes them.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let value = {
            let entries = self.entries.read();
            entries
                .get(key)
                .filter(|entry| !entry.is_expired_at(now))
                .map(|entry| entry.value.clone())
        };

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// Overwrites any existing entry. A TTL of zero or less means the value
    /// is not cached at all, and any previous value for `key` is dropped.
    pub fn set(&self, key: impl Into<String>, value: V, ttl_seconds: i64) {
        let key = key.into();
        let mut entries = self.entries.write();

        if ttl_seconds <= 0 {
            entries.remove(&key);
            return;
        }

        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());
        entries.insert(key, entry);
    }

    // == Generation ==
    /// Returns the invalidation generation. Any `delete` or
    /// `delete_by_prefix` call advances it, whether or not it removed
    /// anything.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    // == Set If Unchanged ==
    /// Like [`CacheStore::set`], but only stores `value` if no invalidation
    /// has happened since `generation` was read.
    ///
    /// Cache-aside readers read the generation before rendering, so a value
    /// rendered from data an admin write has since replaced is dropped
    /// instead of cached. Returns whether the value was stored.
    pub fn set_if_unchanged(
        &self,
        key: impl Into<String>,
        value: V,
        ttl_seconds: i64,
        generation: u64,
    ) -> bool {
        let key = key.into();
        let mut entries = self.entries.write();

        if self.generation.load(Ordering::Acquire) != generation || ttl_seconds <= 0 {
            return false;
        }

        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());
        entries.insert(key, entry);
        true
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            self.generation.fetch_add(1, Ordering::AcqRel);
            entries.remove(key).is_some()
        };
        if removed {
            self.stats.record_invalidated(1);
        }
        removed
    }

    // == Delete By Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Matching is textual: `page:products` also removes `page:productsX`.
    /// Returns the number of entries removed.
    pub fn delete_by_prefix(&self, prefix: &str) -> usize {
        let removed = {
            let mut entries = self.entries.write();
            self.generation.fetch_add(1, Ordering::AcqRel);
            let before = entries.len();
            entries.retain(|key, _| !key.starts_with(prefix));
            before - entries.len()
        };

        self.stats.record_invalidated(removed);
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            before - entries.len()
        };

        self.stats.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.read().len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl<V: Clone + Send + Sync + 'static> Sweep for CacheStore<V> {
    fn sweep(&self) -> usize {
        self.cleanup_expired()
    }
}
