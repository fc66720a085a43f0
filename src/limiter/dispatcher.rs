//! Rate-Limited Dispatcher
//!
//! Bounds the number of upstream calls in flight and the spacing between
//! their start times.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, Instant};
use tracing::debug;

// == Dispatcher ==
/// Runs futures under a concurrency cap and a minimum start interval.
///
/// The two throttles are independent: with 10 permits and a 100ms interval at
/// most one call starts per 100ms even though up to 10 may be running.
#[derive(Debug)]
pub struct Dispatcher {
    permits: Semaphore,
    /// Start instant of the most recently dispatched call
    last_start: Mutex<Option<Instant>>,
    min_interval: Duration,
    concurrency_limit: usize,
}

impl Dispatcher {
    // == Constructor ==
    /// Creates a dispatcher allowing `concurrency_limit` calls in flight and
    /// at most `requests_per_second` call starts per second.
    ///
    /// A rate of zero (or any non-positive or non-finite value) disables
    /// pacing. `concurrency_limit` is clamped to at least 1.
    pub fn new(concurrency_limit: usize, requests_per_second: f64) -> Self {
        let concurrency_limit = concurrency_limit.max(1);
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            // Rates so small that 1/rate overflows saturate.
            Duration::try_from_secs_f64(1.0 / requests_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };

        Self {
            permits: Semaphore::new(concurrency_limit),
            last_start: Mutex::new(None),
            min_interval,
            concurrency_limit,
        }
    }

    // == Run ==
    /// Runs `f` once a permit is free and the pacing interval has elapsed.
    ///
    /// The permit is held until the returned future completes and is released
    /// on every exit path, including cancellation of the caller.
    pub async fn run<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // The semaphore is private and never closed.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("dispatcher semaphore is never closed");

        self.pace().await;
        f().await
    }

    /// Waits until `min_interval` has passed since the previous call start.
    ///
    /// The lock is held across the wait so start times are strictly
    /// serialized.
    async fn pace(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let elapsed = Instant::now().saturating_duration_since(previous);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Pacing upstream call");
                // `sleep` clamps deadlines past the timer horizon.
                sleep(wait).await;
            }
        }
        *last_start = Some(Instant::now());
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Minimum spacing between call starts, zero when pacing is disabled.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Permits not currently held by a running call.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Number of calls currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.concurrency_limit - self.available_permits()
    }
}
