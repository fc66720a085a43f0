//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.
//! All timestamps are monotonic and unaffected by wall-clock adjustments.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation instant
    pub created_at: Instant,
    /// Last read or write instant
    pub last_accessed: Instant,
    /// Effective TTL for this entry, `Duration::ZERO` = no expiration
    pub ttl: Duration,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after `now`.
    ///
    /// A zero TTL means the entry never expires by time.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            last_accessed: now,
            ttl,
            expires_at: deadline(now, ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so an entry is never
    /// served after its full TTL has elapsed.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Refresh ==
    /// Restarts the entry's own TTL from `now` and marks it accessed.
    pub fn refresh(&mut self, now: Instant) {
        self.last_accessed = now;
        self.expires_at = deadline(now, self.ttl);
    }
}

/// Computes `now + ttl`, treating a zero TTL as "never".
fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        now.checked_add(ttl)
    }
}
