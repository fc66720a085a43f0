//! Upstream Module
//!
//! Network access to the PyPI JSON API.
//!
//! # Components
//! - `UpstreamClient`: one rate-limited GET, status codes folded into `PypiError`
//! - `PypiClient`: memoized package, version and index queries

mod client;
mod pypi;

pub use client::UpstreamClient;
pub use pypi::{PypiClient, PACKAGE_INFO_TTL, PACKAGE_VERSIONS_TTL, PYPI_STATS_TTL};
