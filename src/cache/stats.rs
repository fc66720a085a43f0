//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! expirations.

use std::time::Duration;

use serde::Serialize;

// == Cache Counters ==
/// Cumulative counters owned by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed to respect the size bound
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }
}

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    /// Current number of live entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Store-wide default TTL, zero = entries never expire
    #[serde(rename = "default_ttl_secs", serialize_with = "serialize_secs")]
    pub default_ttl: Duration,
}

impl CacheStats {
    // == Constructor ==
    pub fn new(counters: CacheCounters, size: usize, max_size: usize, default_ttl: Duration) -> Self {
        Self {
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expired: counters.expired,
            size,
            max_size,
            default_ttl,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or None if no requests have been made.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }
}

fn serialize_secs<S: serde::Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(ttl.as_secs_f64())
}
