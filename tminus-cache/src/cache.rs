//! In-memory LRU cache for rendered countdowns.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use tminus_core::constants::DEFAULT_CACHE_CAPACITY;
use tminus_core::error::{CountdownError, Result};

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Fixed-capacity cache with least-recently-used eviction.
///
/// Ordering and lookup live in one [`LruCache`] (doubly-linked list plus hash
/// index), so every operation is O(1). Promotion mutates the ordering, which
/// means [`fetch`](Self::fetch) and [`store`](Self::store) take the write
/// lock; [`contains`](Self::contains) and the size queries only need the read
/// lock and run concurrently.
///
/// Values are cloned out on fetch. With `bytes::Bytes` payloads that is a
/// reference-count bump.
pub struct RecencyCache<V> {
    entries: RwLock<LruCache<String, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> RecencyCache<V> {
    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(capacity)
    }

    /// Creates a cache from configuration, rejecting a zero capacity.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity).ok_or_else(|| {
            CountdownError::InvalidConfig("cache capacity must be at least 1".into())
        })?;
        Ok(Self::with_capacity(capacity))
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Looks up `key`, promoting it to most-recently-used on a hit.
    pub fn fetch(&self, key: &str) -> Option<V> {
        let value = self.entries.write().get(key).cloned();
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    /// Inserts or overwrites `key` as the most-recently-used entry.
    ///
    /// Inserting a new key into a full cache evicts exactly one entry, the
    /// least recently used, under the same lock acquisition.
    pub fn store(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.write();
        match entries.push(key.into(), value) {
            // `push` hands back the old pair both when it replaced the key
            // and when it evicted the tail; only the latter leaves it absent.
            Some((displaced, _)) if !entries.contains(displaced.as_str()) => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(key = %displaced, "Evicted least recently used entry");
            }
            Some(_) => {}
            None => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Returns true if `key` is cached, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains(key)
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Maximum number of entries, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.entries.read().cap().get()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone> Default for RecencyCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Fetches that found their key
    pub hits: u64,
    /// Fetches that did not
    pub misses: u64,
    /// Stores that added a new key
    pub inserts: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
}
