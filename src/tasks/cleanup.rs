//! Expiry Purge Task
//!
//! Background task that periodically removes expired cache entries, so an
//! idle process does not keep stale results alive until the next access.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that calls `purge_expired` every `interval`.
///
/// Returns `None` without spawning when `interval` is zero. The returned
/// handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = shared_cache(CacheStore::new(1000, Duration::from_secs(300)));
/// let handle = spawn_purge_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// if let Some(handle) = handle { handle.abort(); }
/// ```
pub fn spawn_purge_task(cache: SharedCache, interval: Duration) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("Expiry purge task disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            "Starting expiry purge task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.lock().await.purge_expired();

            if removed > 0 {
                info!("Expiry purge: removed {} expired entries", removed);
            } else {
                debug!("Expiry purge: no expired entries found");
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared_cache, CacheStore};
    use serde_json::json;

    fn cache() -> SharedCache {
        shared_cache(CacheStore::new(100, Duration::from_secs(300)))
    }

    #[tokio::test]
    async fn test_purge_task_removes_expired_entries() {
        let cache = cache();
        cache
            .lock()
            .await
            .set("expire_soon", json!("value"), Some(Duration::from_millis(50)));

        let handle = spawn_purge_task(cache.clone(), Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;

        // len() does not purge, so only the task can have removed it.
        let guard = cache.lock().await;
        assert_eq!(guard.len(), 0);
        drop(guard);

        assert_eq!(cache.lock().await.stats().expired, 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_purge_task_preserves_valid_entries() {
        let cache = cache();
        cache
            .lock()
            .await
            .set("long_lived", json!("value"), Some(Duration::from_secs(3600)));

        let handle = spawn_purge_task(cache.clone(), Duration::from_millis(50)).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.lock().await.get("long_lived"), Some(json!("value")));
        handle.abort();
    }

    #[tokio::test]
    async fn test_zero_interval_disables_task() {
        assert!(spawn_purge_task(cache(), Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_purge_task_can_be_aborted() {
        let handle = spawn_purge_task(cache(), Duration::from_secs(1)).unwrap();

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
