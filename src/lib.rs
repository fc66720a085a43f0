//! PyPI Cache - A cached, rate-limited PyPI metadata service
//!
//! Answers package metadata queries from an in-memory TTL + LRU cache and
//! falls back to PyPI through a concurrency- and rate-limited dispatcher.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod requirement;
pub mod tasks;
pub mod upstream;
pub mod validation;
pub mod version;

pub use api::{create_router, AppState};
pub use cache::{CacheStore, Fingerprint, Memoizer};
pub use config::Config;
pub use error::{PypiError, Result};
pub use limiter::Dispatcher;
pub use tasks::spawn_purge_task;
pub use upstream::{PypiClient, UpstreamClient};
