//! Validation Module
//!
//! Checks caller-supplied package names and versions before they reach the
//! cache or the upstream.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PypiError, Result};
use crate::version::Version;

static PACKAGE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("package name pattern is valid")
});

static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));

/// Rejects names PyPI would never serve.
pub fn validate_package_name(name: &str) -> Result<()> {
    if PACKAGE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(PypiError::validation(
            "package_name",
            name,
            "Invalid package name format",
        ))
    }
}

/// Rejects strings that are not PEP 440 versions.
pub fn validate_version(version: &str) -> Result<()> {
    validate_version_field("version", version)
}

/// Same as [`validate_version`], reporting the failure against `field`.
pub fn validate_version_field(field: &str, version: &str) -> Result<()> {
    match Version::parse(version) {
        Some(_) => Ok(()),
        None => Err(PypiError::validation(
            field,
            version,
            "Invalid version format",
        )),
    }
}

/// Strips surrounding whitespace and a single leading `v`, both of which
/// version parsing tolerates but PyPI URLs do not.
pub fn clean_version(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed)
}

/// PEP 503 normalization: lowercase, runs of `-_.` collapsed to `-`.
pub fn normalize_package_name(name: &str) -> String {
    SEPARATOR_RUN_RE.replace_all(name, "-").to_lowercase()
}
