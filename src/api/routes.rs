//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_handler, compare_handler, dependencies_handler, health_handler,
    package_handler, purge_handler, pypi_stats_handler, versions_handler,
    vulnerabilities_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /packages/:name` - Package metadata, `?version=` for a specific release
/// - `GET /packages/:name/versions` - Version listing
/// - `GET /packages/:name/compare` - Compare `?version1=` with `?version2=`
/// - `GET /packages/:name/dependencies` - Dependency breakdown
/// - `GET /packages/:name/vulnerabilities` - Security assessment
/// - `GET /pypi/stats` - Index-wide statistics
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/purge` - Remove expired entries now
/// - `DELETE /cache` - Clear the cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/packages/:name", get(package_handler))
        .route("/packages/:name/versions", get(versions_handler))
        .route("/packages/:name/compare", get(compare_handler))
        .route("/packages/:name/dependencies", get(dependencies_handler))
        .route("/packages/:name/vulnerabilities", get(vulnerabilities_handler))
        .route("/pypi/stats", get(pypi_stats_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/purge", post(purge_handler))
        .route("/cache", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
