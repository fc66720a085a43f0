//! Data models for the PyPI cache service
//!
//! Upstream package documents, the reports derived from them, and the DTOs
//! used for HTTP query strings and response bodies.

pub mod package;
pub mod reports;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use package::{PackageInfo, ProjectInfo, PypiStats, ReleaseFile, TopPackage, Vulnerability};
pub use reports::{
    CompareResponse, DependenciesResponse, Severity, VersionComparison, VersionSummary,
    VulnerabilitiesResponse, VulnerabilityReport,
};
pub use requests::{CompareQuery, DependenciesQuery, PackageQuery, VersionsQuery};
pub use responses::{
    CacheStatsResponse, ClearResponse, ErrorResponse, HealthResponse, PurgeResponse,
    VersionEntry, VersionsResponse,
};
