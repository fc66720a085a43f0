//! Request DTOs for the service API
//!
//! Defines the query strings accepted by the package endpoints.

use serde::Deserialize;

use crate::error::Result;
use crate::validation::{validate_package_name, validate_version, validate_version_field};

/// Query for `GET /packages/:name`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageQuery {
    /// Specific release, latest if absent
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageQuery {
    /// Validates the package name and optional version.
    pub fn validate(&self, package_name: &str) -> Result<()> {
        validate_package_name(package_name)?;
        if let Some(version) = &self.version {
            validate_version(version)?;
        }
        Ok(())
    }
}

/// Query for `GET /packages/:name/versions`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionsQuery {
    /// Maximum number of versions to return
    #[serde(default)]
    pub limit: Option<usize>,
    /// Include pre-release and development versions
    #[serde(default = "default_true")]
    pub include_prereleases: bool,
}

impl Default for VersionsQuery {
    fn default() -> Self {
        Self {
            limit: None,
            include_prereleases: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Query for `GET /packages/:name/compare`
#[derive(Debug, Clone, Deserialize)]
pub struct CompareQuery {
    pub version1: String,
    pub version2: String,
}

impl CompareQuery {
    pub fn validate(&self, package_name: &str) -> Result<()> {
        validate_package_name(package_name)?;
        validate_version_field("version1", &self.version1)?;
        validate_version_field("version2", &self.version2)
    }
}

/// Query for `GET /packages/:name/dependencies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependenciesQuery {
    #[serde(default)]
    pub version: Option<String>,
    /// Also report dependencies grouped by extra
    #[serde(default)]
    pub include_extras: bool,
}
