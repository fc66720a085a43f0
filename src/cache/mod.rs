//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, plus the
//! memoizing wrapper that routes upstream queries through the cache.

mod entry;
mod key;
mod lru;
mod memo;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use tokio::sync::Mutex;

// Re-export public types
pub use entry::CacheEntry;
pub use key::Fingerprint;
pub use lru::LruTracker;
pub use memo::Memoizer;
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;

/// Process-wide store of JSON documents, serialized behind one exclusive lock.
pub type SharedCache = Arc<Mutex<CacheStore<serde_json::Value>>>;

/// Wraps a store for sharing between tasks.
pub fn shared_cache(store: CacheStore<serde_json::Value>) -> SharedCache {
    Arc::new(Mutex::new(store))
}
