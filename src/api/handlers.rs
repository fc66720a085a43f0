//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use reqwest::Url;

use crate::cache::{shared_cache, CacheStore, Memoizer, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::limiter::Dispatcher;
use crate::models::{
    CacheStatsResponse, ClearResponse, CompareQuery, CompareResponse, DependenciesQuery,
    DependenciesResponse, HealthResponse, PackageInfo, PackageQuery, PurgeResponse, PypiStats,
    VersionsQuery, VersionsResponse, VulnerabilitiesResponse,
};
use crate::upstream::{PypiClient, UpstreamClient};
use crate::validation::{
    clean_version, normalize_package_name, validate_package_name, validate_version,
};

/// Application state shared across all handlers.
///
/// One cache and one dispatcher per process, owned here rather than held in
/// globals.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared memoization store
    pub cache: SharedCache,
    /// Upstream concurrency and pacing
    pub dispatcher: Arc<Dispatcher>,
    pub pypi: Arc<PypiClient>,
}

impl AppState {
    /// Wires the cache, dispatcher and upstream client together.
    pub fn new(cache: SharedCache, upstream: UpstreamClient, base_url: Url) -> Self {
        let dispatcher = upstream.dispatcher().clone();
        let pypi = PypiClient::new(upstream, Memoizer::new(cache.clone()), base_url);
        Self {
            cache,
            dispatcher,
            pypi: Arc::new(pypi),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = shared_cache(CacheStore::new(config.cache_max_size, config.default_ttl()));
        let dispatcher = Arc::new(Dispatcher::new(
            config.max_concurrent_requests,
            config.rate_limit,
        ));
        let base_url = Url::parse(&config.pypi_base_url)
            .with_context(|| format!("invalid PYPI_BASE_URL: {}", config.pypi_base_url))?;
        let upstream = UpstreamClient::from_config(config, dispatcher)
            .context("failed to build HTTP client")?;

        Ok(Self::new(cache, upstream, base_url))
    }
}

/// Handler for GET /packages/:name
///
/// Returns metadata for the latest release, or for `?version=` if given.
pub async fn package_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PackageQuery>,
) -> Result<Json<PackageInfo>> {
    query.validate(&name)?;
    let info = state
        .pypi
        .package_info(&name, query.version.as_deref())
        .await?;
    Ok(Json(info))
}

/// Handler for GET /packages/:name/versions
///
/// Lists released versions newest first, with optional filtering.
pub async fn versions_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<VersionsQuery>,
) -> Result<Json<VersionsResponse>> {
    let versions = state.pypi.package_versions(&name).await?;
    Ok(Json(VersionsResponse::new(
        normalize_package_name(&name),
        &versions,
        query.include_prereleases,
        query.limit,
    )))
}

/// Handler for GET /packages/:name/compare
///
/// Compares `?version1=` against `?version2=`, fetching both releases.
pub async fn compare_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<CompareResponse>> {
    query.validate(&name)?;
    let version1 = clean_version(&query.version1);
    let version2 = clean_version(&query.version2);

    let (package1, package2) = tokio::try_join!(
        state.pypi.package_info(&name, Some(version1)),
        state.pypi.package_info(&name, Some(version2)),
    )?;

    Ok(Json(CompareResponse::new(
        normalize_package_name(&name),
        (version1, &package1),
        (version2, &package2),
    )))
}

/// Handler for GET /packages/:name/dependencies
///
/// Breaks `requires_dist` down into runtime, development and optional
/// dependencies.
pub async fn dependencies_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DependenciesQuery>,
) -> Result<Json<DependenciesResponse>> {
    validate_package_name(&name)?;
    if let Some(version) = &query.version {
        validate_version(version)?;
    }
    let info = state
        .pypi
        .package_info(&name, query.version.as_deref())
        .await?;
    Ok(Json(DependenciesResponse::new(&info, query.include_extras)))
}

/// Handler for GET /packages/:name/vulnerabilities
pub async fn vulnerabilities_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PackageQuery>,
) -> Result<Json<VulnerabilitiesResponse>> {
    query.validate(&name)?;
    let info = state
        .pypi
        .package_info(&name, query.version.as_deref())
        .await?;
    Ok(Json(VulnerabilitiesResponse::new(&info)))
}

/// Handler for GET /pypi/stats
pub async fn pypi_stats_handler(State(state): State<AppState>) -> Json<PypiStats> {
    Json(state.pypi.pypi_stats().await)
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.lock().await.stats();
    Json(CacheStatsResponse::new(stats))
}

/// Handler for POST /cache/purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.lock().await.purge_expired();
    Json(PurgeResponse { removed })
}

/// Handler for DELETE /cache
///
/// Drops every entry and resets the counters.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.lock().await.clear();
    Json(ClearResponse::new())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
