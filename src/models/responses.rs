//! Response DTOs for the service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::version::{classify_version, VersionKind};

/// One entry of a version listing
#[derive(Debug, Clone, Serialize)]
pub struct VersionEntry {
    pub version: String,
    /// "stable", "pre-release" or "development"
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub is_latest: bool,
}

/// Response body for `GET /packages/:name/versions`
#[derive(Debug, Clone, Serialize)]
pub struct VersionsResponse {
    pub package_name: String,
    /// Number of versions with at least one file
    pub total_versions: usize,
    pub returned_versions: usize,
    pub latest_version: Option<String>,
    pub versions: Vec<VersionEntry>,
}

impl VersionsResponse {
    /// Builds a listing from versions sorted newest first.
    pub fn new(
        package_name: impl Into<String>,
        versions: &[String],
        include_prereleases: bool,
        limit: Option<usize>,
    ) -> Self {
        let latest = versions.first();
        let entries: Vec<VersionEntry> = versions
            .iter()
            .filter_map(|version| {
                let kind = classify_version(version);
                if !include_prereleases && kind != VersionKind::Stable {
                    return None;
                }
                Some(VersionEntry {
                    version: version.clone(),
                    kind: kind.as_str(),
                    is_latest: Some(version) == latest,
                })
            })
            // A limit of zero means no limit.
            .take(limit.filter(|&n| n > 0).unwrap_or(usize::MAX))
            .collect();

        Self {
            package_name: package_name.into(),
            total_versions: versions.len(),
            returned_versions: entries.len(),
            latest_version: latest.cloned(),
            versions: entries,
        }
    }
}

/// Response body for the stats endpoint (`GET /cache/stats`)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// hits / (hits + misses), null before the first lookup
    pub hit_rate: Option<f64>,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for `POST /cache/purge`
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    /// Number of expired entries removed
    pub removed: usize,
}

/// Response body for `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (`GET /health`)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheCounters;
    use std::time::Duration;

    fn versions() -> Vec<String> {
        ["2.0", "2.0rc1", "1.1", "1.1.dev3", "1.0"]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_versions_response_all() {
        let resp = VersionsResponse::new("demo", &versions(), true, None);

        assert_eq!(resp.total_versions, 5);
        assert_eq!(resp.returned_versions, 5);
        assert_eq!(resp.latest_version.as_deref(), Some("2.0"));
        assert!(resp.versions[0].is_latest);
        assert!(!resp.versions[1].is_latest);
        assert_eq!(resp.versions[1].kind, "pre-release");
        assert_eq!(resp.versions[3].kind, "development");
    }

    #[test]
    fn test_versions_response_stable_only_with_limit() {
        let resp = VersionsResponse::new("demo", &versions(), false, Some(2));

        let listed: Vec<&str> = resp.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(listed, vec!["2.0", "1.1"]);
        assert_eq!(resp.returned_versions, 2);
        assert_eq!(resp.total_versions, 5);
    }

    #[test]
    fn test_versions_response_zero_limit_returns_everything() {
        let resp = VersionsResponse::new("demo", &versions(), true, Some(0));
        assert_eq!(resp.returned_versions, 5);
        assert_eq!(resp.versions.len(), 5);
    }

    #[test]
    fn test_versions_response_empty() {
        let resp = VersionsResponse::new("demo", &[], true, None);
        assert!(resp.latest_version.is_none());
        assert!(resp.versions.is_empty());
    }

    #[test]
    fn test_cache_stats_response_serialize() {
        let counters = CacheCounters {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        let resp = CacheStatsResponse::new(CacheStats::new(counters, 2, 10, Duration::from_secs(60)));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["hits"], 3);
        assert_eq!(json["size"], 2);
        assert_eq!(json["hit_rate"], 0.75);
    }

    #[test]
    fn test_cache_stats_response_no_requests() {
        let resp = CacheStatsResponse::new(CacheStats::new(
            CacheCounters::default(),
            0,
            10,
            Duration::ZERO,
        ));
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["hit_rate"].is_null());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
