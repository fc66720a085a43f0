//! Package metadata models
//!
//! Typed views of the PyPI JSON API documents. The same types are cached as
//! JSON, so every field round-trips through serde.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Package metadata for one release, as served by `/pypi/<name>[/<version>]/json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub info: ProjectInfo,
    /// Distribution files of this release
    #[serde(default, deserialize_with = "nullable")]
    pub urls: Vec<ReleaseFile>,
    /// Known vulnerabilities affecting this release
    #[serde(default, deserialize_with = "nullable")]
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Core project metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author_email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub maintainer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub maintainer_email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub license: String,
    #[serde(default, deserialize_with = "nullable")]
    pub home_page: String,
    #[serde(default, deserialize_with = "nullable")]
    pub keywords: String,
    #[serde(default)]
    pub requires_python: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub requires_dist: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub provides_extra: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub classifiers: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default)]
    pub yanked_reason: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub package_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub project_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub release_url: String,
}

/// A wheel or source distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    /// "bdist_wheel", "sdist", ...
    #[serde(default, deserialize_with = "nullable")]
    pub packagetype: String,
    #[serde(default, deserialize_with = "nullable")]
    pub python_version: String,
    #[serde(default)]
    pub requires_python: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub digests: BTreeMap<String, String>,
    #[serde(rename = "upload_time_iso_8601", default)]
    pub upload_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default)]
    pub yanked_reason: Option<String>,
}

/// A security advisory attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub source: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub details: String,
    #[serde(default, deserialize_with = "nullable")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub fixed_in: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub withdrawn: Option<DateTime<Utc>>,
}

/// Index-wide statistics from `/stats/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PypiStats {
    /// Total bytes stored across all packages
    pub total_packages_size: u64,
    /// Largest projects by storage size
    #[serde(default, deserialize_with = "nullable")]
    pub top_packages: BTreeMap<String, TopPackage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TopPackage {
    pub size: u64,
}
