//! PyPI query client
//!
//! Memoized, rate-limited queries against the PyPI JSON API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::cache::{Fingerprint, Memoizer};
use crate::error::{PypiError, Result};
use crate::models::{PackageInfo, PypiStats};
use crate::upstream::UpstreamClient;
use crate::validation::{
    clean_version, normalize_package_name, validate_package_name, validate_version,
};
use crate::version::sort_versions_desc;

pub const PACKAGE_INFO_TTL: Duration = Duration::from_secs(300);
pub const PACKAGE_VERSIONS_TTL: Duration = Duration::from_secs(600);
pub const PYPI_STATS_TTL: Duration = Duration::from_secs(3600);

/// Only the release map of the project document is needed for listings.
#[derive(Debug, Deserialize)]
struct ReleasesDocument {
    #[serde(default)]
    releases: BTreeMap<String, Option<Vec<serde_json::Value>>>,
}

// == PyPI Client ==
/// Answers package queries from the shared cache, falling back to PyPI.
#[derive(Debug, Clone)]
pub struct PypiClient {
    upstream: UpstreamClient,
    memo: Memoizer,
    base_url: Url,
}

impl PypiClient {
    pub fn new(upstream: UpstreamClient, memo: Memoizer, base_url: Url) -> Self {
        Self {
            upstream,
            memo,
            base_url,
        }
    }

    pub fn memoizer(&self) -> &Memoizer {
        &self.memo
    }

    // == Package Info ==
    /// Metadata for the latest release of `name`, or for `version` if given.
    pub async fn package_info(&self, name: &str, version: Option<&str>) -> Result<PackageInfo> {
        validate_package_name(name)?;
        if let Some(version) = version {
            validate_version(version)?;
        }

        let name = normalize_package_name(name);
        let version = version.map(clean_version);
        let fingerprint = Fingerprint::new("package_info")
            .arg(name.as_str())
            .kwarg("version", version);

        self.memo
            .get_or_fetch(&fingerprint, Some(PACKAGE_INFO_TTL), || {
                self.fetch_package_info(&name, version)
            })
            .await
    }

    async fn fetch_package_info(&self, name: &str, version: Option<&str>) -> Result<PackageInfo> {
        let url = match version {
            Some(version) => self.endpoint(&["pypi", name, version, "json"])?,
            None => self.endpoint(&["pypi", name, "json"])?,
        };

        self.upstream
            .get_json(url, HeaderMap::new())
            .await
            .map_err(|err| match err {
                PypiError::NotFound(_) => PypiError::NotFound(match version {
                    Some(version) => {
                        format!("Version '{}' of package '{}' not found", version, name)
                    }
                    None => package_not_found(name),
                }),
                other => other,
            })
    }

    // == Package Versions ==
    /// Versions of `name` that have at least one file, newest first.
    pub async fn package_versions(&self, name: &str) -> Result<Vec<String>> {
        validate_package_name(name)?;

        let name = normalize_package_name(name);
        let fingerprint = Fingerprint::new("package_versions").arg(name.as_str());

        self.memo
            .get_or_fetch(&fingerprint, Some(PACKAGE_VERSIONS_TTL), || {
                self.fetch_package_versions(&name)
            })
            .await
    }

    async fn fetch_package_versions(&self, name: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["pypi", name, "json"])?;
        let document: ReleasesDocument = self
            .upstream
            .get_json(url, HeaderMap::new())
            .await
            .map_err(|err| match err {
                PypiError::NotFound(_) => PypiError::NotFound(package_not_found(name)),
                other => other,
            })?;

        let mut versions: Vec<String> = document
            .releases
            .into_iter()
            .filter(|(_, files)| files.as_ref().is_some_and(|files| !files.is_empty()))
            .map(|(version, _)| version)
            .collect();
        sort_versions_desc(&mut versions);
        Ok(versions)
    }

    // == PyPI Stats ==
    /// Index-wide statistics.
    ///
    /// Any failure is logged and answered with empty statistics. The empty
    /// result is not cached, so the next call retries upstream.
    pub async fn pypi_stats(&self) -> PypiStats {
        let fingerprint = Fingerprint::new("pypi_stats");

        match self
            .memo
            .get_or_fetch(&fingerprint, Some(PYPI_STATS_TTL), || self.fetch_pypi_stats())
            .await
        {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "PyPI stats unavailable, returning empty statistics");
                PypiStats::default()
            }
        }
    }

    async fn fetch_pypi_stats(&self) -> Result<PypiStats> {
        // Trailing empty segment keeps the slash PyPI expects on /stats/.
        let url = self.endpoint(&["stats", ""])?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        self.upstream.get_json(url, headers).await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PypiError::Upstream {
                status: None,
                message: format!("Base URL cannot carry a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn package_not_found(name: &str) -> String {
    format!("Package '{}' not found on PyPI", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared_cache, CacheStore};
    use crate::limiter::Dispatcher;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Hits {
        project: Arc<AtomicUsize>,
        stats: Arc<AtomicUsize>,
    }

    async fn project(State(hits): State<Hits>, Path(name): Path<String>) -> Response {
        hits.project.fetch_add(1, Ordering::SeqCst);
        if name != "demo-pkg" {
            return StatusCode::NOT_FOUND.into_response();
        }
        Json(json!({
            "info": {"name": "demo-pkg", "version": "2.0.0", "summary": null},
            "urls": [],
            "releases": {
                "1.0.0": [{}],
                "10.0.0rc1": [{}],
                "2.0.0": [{}],
                "0.0.1": []
            }
        }))
        .into_response()
    }

    async fn release(
        State(hits): State<Hits>,
        Path((name, version)): Path<(String, String)>,
    ) -> Response {
        hits.project.fetch_add(1, Ordering::SeqCst);
        if name == "demo-pkg" && version == "1.0.0" {
            Json(json!({"info": {"name": "demo-pkg", "version": "1.0.0"}})).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    async fn stats(State(hits): State<Hits>) -> StatusCode {
        hits.stats.fetch_add(1, Ordering::SeqCst);
        StatusCode::SERVICE_UNAVAILABLE
    }

    async fn pypi_client() -> (PypiClient, Hits) {
        let hits = Hits::default();
        let app = Router::new()
            .route("/pypi/:name/json", get(project))
            .route("/pypi/:name/:version/json", get(release))
            .route("/stats/", get(stats))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let upstream = UpstreamClient::new(
            reqwest::Client::new(),
            Arc::new(Dispatcher::new(2, 0.0)),
        );
        let memo = Memoizer::new(shared_cache(CacheStore::new(100, Duration::from_secs(300))));
        let base_url = Url::parse(&format!("http://{}", addr)).unwrap();
        (PypiClient::new(upstream, memo, base_url), hits)
    }

    #[tokio::test]
    async fn test_package_info_is_memoized_across_name_spellings() {
        let (client, hits) = pypi_client().await;

        let first = client.package_info("Demo_Pkg", None).await.unwrap();
        let second = client.package_info("demo-pkg", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.info.version, "2.0.0");
        assert_eq!(hits.project.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_package_not_found_is_redescribed_and_not_cached() {
        let (client, hits) = pypi_client().await;

        for _ in 0..2 {
            let err = client.package_info("missing", None).await.unwrap_err();
            assert_eq!(
                err,
                PypiError::NotFound("Package 'missing' not found on PyPI".to_string())
            );
        }
        assert_eq!(hits.project.load(Ordering::SeqCst), 2);
        assert_eq!(client.memoizer().cache().lock().await.size(), 0);
    }

    #[tokio::test]
    async fn test_version_not_found_message() {
        let (client, _) = pypi_client().await;
        let err = client.package_info("demo-pkg", Some("9.9")).await.unwrap_err();
        assert_eq!(
            err,
            PypiError::NotFound("Version '9.9' of package 'demo-pkg' not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_padded_version_shares_cache_entry() {
        let (client, hits) = pypi_client().await;

        let plain = client.package_info("demo-pkg", Some("1.0.0")).await.unwrap();
        let padded = client.package_info("demo-pkg", Some(" v1.0.0 ")).await.unwrap();

        assert_eq!(plain, padded);
        assert_eq!(plain.info.version, "1.0.0");
        assert_eq!(hits.project.load(Ordering::SeqCst), 1);

        let err = client.package_info("demo-pkg", Some(" 9.9")).await.unwrap_err();
        assert_eq!(
            err,
            PypiError::NotFound("Version '9.9' of package 'demo-pkg' not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_upstream() {
        let (client, hits) = pypi_client().await;

        assert!(matches!(
            client.package_info("-bad-", None).await,
            Err(PypiError::Validation { .. })
        ));
        assert!(matches!(
            client.package_info("demo-pkg", Some("not a version")).await,
            Err(PypiError::Validation { .. })
        ));
        assert!(matches!(
            client.package_versions("bad name").await,
            Err(PypiError::Validation { .. })
        ));
        assert_eq!(hits.project.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_package_versions_sorted_and_filtered() {
        let (client, hits) = pypi_client().await;

        let versions = client.package_versions("demo-pkg").await.unwrap();
        assert_eq!(versions, vec!["10.0.0rc1", "2.0.0", "1.0.0"]);

        client.package_versions("demo-pkg").await.unwrap();
        assert_eq!(hits.project.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pypi_stats_degrades_without_caching() {
        let (client, hits) = pypi_client().await;

        assert_eq!(client.pypi_stats().await, PypiStats::default());
        assert_eq!(client.pypi_stats().await, PypiStats::default());
        assert_eq!(hits.stats.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_endpoint_encodes_segments() {
        let (client, _) = pypi_client().await;

        let url = client.endpoint(&["pypi", "a b", "json"]).unwrap();
        assert!(url.path().ends_with("/pypi/a%20b/json"));

        let url = client.endpoint(&["stats", ""]).unwrap();
        assert!(url.path().ends_with("/stats/"));
    }
}
