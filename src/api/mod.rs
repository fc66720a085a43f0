//! API Module
//!
//! HTTP handlers and routing for the service REST API.
//!
//! # Endpoints
//! - `GET /packages/:name` - Package metadata
//! - `GET /packages/:name/versions` - Version listing
//! - `GET /packages/:name/compare` - Version comparison
//! - `GET /packages/:name/dependencies` - Dependency breakdown
//! - `GET /packages/:name/vulnerabilities` - Security assessment
//! - `GET /pypi/stats` - Index-wide statistics
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/purge` - Purge expired entries
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
