//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub cache_max_size: usize,
    /// Default TTL in seconds for cached results, 0 = never expire
    pub cache_ttl: u64,
    /// Interval in seconds between background purges of expired entries, 0 = disabled
    pub purge_interval: u64,
    /// Maximum number of upstream requests in flight
    pub max_concurrent_requests: usize,
    /// Maximum upstream request starts per second, 0 = unpaced
    pub rate_limit: f64,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
    /// Base URL of the PyPI JSON API
    pub pypi_base_url: String,
    /// User-Agent header sent upstream
    pub user_agent: String,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_PURGE_INTERVAL` - Purge frequency in seconds (default: 60)
    /// - `MAX_CONCURRENT_REQUESTS` - Upstream concurrency (default: 10)
    /// - `RATE_LIMIT` - Upstream requests per second (default: 10.0)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `PYPI_BASE_URL` - PyPI base URL (default: https://pypi.org)
    /// - `USER_AGENT` - Upstream User-Agent (default: pypi-cache/<version>)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            cache_max_size: parse_with(&lookup, "CACHE_MAX_SIZE")
                .unwrap_or(defaults.cache_max_size),
            cache_ttl: parse_with(&lookup, "CACHE_TTL").unwrap_or(defaults.cache_ttl),
            purge_interval: parse_with(&lookup, "CACHE_PURGE_INTERVAL")
                .unwrap_or(defaults.purge_interval),
            max_concurrent_requests: parse_with(&lookup, "MAX_CONCURRENT_REQUESTS")
                .unwrap_or(defaults.max_concurrent_requests),
            rate_limit: parse_with(&lookup, "RATE_LIMIT")
                .filter(|rate: &f64| rate.is_finite() && *rate >= 0.0)
                .unwrap_or(defaults.rate_limit),
            request_timeout: parse_with(&lookup, "REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout),
            pypi_base_url: lookup("PYPI_BASE_URL").unwrap_or(defaults.pypi_base_url),
            user_agent: lookup("USER_AGENT").unwrap_or(defaults.user_agent),
            server_port: parse_with(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn parse_with<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_size: 1000,
            cache_ttl: 300,
            purge_interval: 60,
            max_concurrent_requests: 10,
            rate_limit: 10.0,
            request_timeout: 30,
            pypi_base_url: "https://pypi.org".to_string(),
            user_agent: concat!("pypi-cache/", env!("CARGO_PKG_VERSION")).to_string(),
            server_port: 3000,
        }
    }
}
