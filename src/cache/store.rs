//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and lazy TTL
//! expiration.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Expiry is lazy: every read and write first sweeps entries whose deadline
/// has passed, so an expired value is never handed out. There is no internal
/// timer; a process that goes idle keeps expired entries in memory until the
/// next operation or an explicit [`CacheStore::purge_expired`].
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Entries with a deadline, ordered soonest first
    expiry: BTreeSet<(Instant, String)>,
    /// Cumulative counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL for entries stored without an override, zero = never expire
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// `max_size` is clamped to at least 1.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expiry: BTreeSet::new(),
            counters: CacheCounters::default(),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit refreshes the key's recency; absence is a normal outcome and is
    /// only reflected in the miss counter.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_with(key, |value| Some(value.clone()))
    }

    /// Retrieves a value by key, reading it through `read`.
    ///
    /// When `read` rejects the stored value the entry is dropped and the
    /// lookup counts as a miss.
    pub fn get_with<T, F>(&mut self, key: &str, read: F) -> Option<T>
    where
        F: FnOnce(&V) -> Option<T>,
    {
        let now = Instant::now();
        self.purge_at(now);

        let read_value = match self.entries.get_mut(key) {
            Some(entry) => {
                let value = read(&entry.value);
                if value.is_some() {
                    entry.last_accessed = now;
                }
                value
            }
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        match read_value {
            Some(value) => {
                self.lru.touch(key);
                self.counters.record_hit();
                Some(value)
            }
            None => {
                self.remove_entry(key);
                self.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair, replacing any previous entry for the key.
    ///
    /// The entry becomes most recently used and expires after `ttl` (or the
    /// store default). Least recently used entries are evicted while the
    /// store is over capacity.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let now = Instant::now();
        self.purge_at(now);
        self.remove_entry(&key);

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl), now);
        if let Some(deadline) = entry.expires_at {
            self.expiry.insert((deadline, key.clone()));
        }
        self.lru.touch(&key);
        self.entries.insert(key, entry);

        while self.entries.len() > self.max_size {
            let Some(oldest) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&oldest) {
                self.unindex(&oldest, &evicted);
            }
            self.counters.record_eviction();
            debug!(key = %oldest, "Evicted least recently used entry");
        }
        debug_assert_eq!(self.lru.len(), self.entries.len());
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is a no-op.
    pub fn delete(&mut self, key: &str) {
        self.remove_entry(key);
    }

    // == Clear ==
    /// Empties the store and resets every counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.expiry.clear();
        self.counters = CacheCounters::default();
    }

    // == Size ==
    /// Returns the number of live entries, sweeping expired ones first.
    pub fn size(&mut self) -> usize {
        self.purge_at(Instant::now());
        self.entries.len()
    }

    // == Touch ==
    /// Restarts a live entry's own TTL and marks it most recently used.
    ///
    /// Returns false if the key is absent or already expired; never creates
    /// an entry.
    pub fn touch(&mut self, key: &str) -> bool {
        let now = Instant::now();
        self.purge_at(now);

        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if let Some(deadline) = entry.expires_at {
            self.expiry.remove(&(deadline, key.to_string()));
        }
        entry.refresh(now);
        if let Some(deadline) = entry.expires_at {
            self.expiry.insert((deadline, key.to_string()));
        }
        self.lru.touch(key);
        true
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_at(Instant::now())
    }

    // == Stats ==
    /// Returns current cache statistics, sweeping expired entries first.
    pub fn stats(&mut self) -> CacheStats {
        let size = self.size();
        CacheStats::new(self.counters, size, self.max_size, self.default_ttl)
    }

    // == Length ==
    /// Returns the number of stored entries without sweeping.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn purge_at(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some((deadline, _)) = self.expiry.first() {
            if *deadline > now {
                break;
            }
            let Some((_, key)) = self.expiry.pop_first() else {
                break;
            };
            self.entries.remove(&key);
            self.lru.remove(&key);
            removed += 1;
        }

        if removed > 0 {
            self.counters.record_expired(removed);
            debug!(removed, "Purged expired entries");
        }
        removed
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.unindex(key, &entry);
        Some(entry)
    }

    fn unindex(&mut self, key: &str, entry: &CacheEntry<V>) {
        if let Some(deadline) = entry.expires_at {
            self.expiry.remove(&(deadline, key.to_string()));
        }
    }
}
