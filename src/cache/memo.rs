//! Memoization Module
//!
//! Sits between callers and upstream fetch functions: answers from the
//! shared cache when possible and stores successful results otherwise.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{Fingerprint, SharedCache};

// == Memoizer ==
/// Memoizes async operations in a shared [`CacheStore`](crate::cache::CacheStore).
///
/// Results are stored as JSON documents so operations with different output
/// types can share one store. Concurrent misses on the same key are not
/// coalesced: each caller runs the operation.
#[derive(Debug, Clone)]
pub struct Memoizer {
    cache: SharedCache,
}

impl Memoizer {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// The underlying shared store.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Get Or Fetch ==
    /// Returns the cached result for `fingerprint`, or runs `fetch` and caches
    /// its successful output for `ttl` (`None` uses the store default).
    ///
    /// A failing `fetch` leaves the cache untouched and its error is returned
    /// as is.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        fingerprint: &Fingerprint,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = fingerprint.key();

        let cached = self.cache.lock().await.get_with(&key, |value| {
            T::deserialize(value)
                .map_err(|err| warn!(key = %key, error = %err, "Discarding undecodable cache entry"))
                .ok()
        });
        if let Some(hit) = cached {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }
        debug!(key = %key, "Cache miss");

        let result = fetch().await?;

        match serde_json::to_value(&result) {
            Ok(value) => self.cache.lock().await.set(key, value, ttl),
            Err(err) => warn!(key = %key, error = %err, "Result not cacheable"),
        }
        Ok(result)
    }
}
