//! Requirement Module
//!
//! Parses `Requires-Dist` entries (PEP 508 requirement strings) into their
//! name, version specifier, extras and environment marker.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::normalize_package_name;

static REQUIREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)
        \s*
        (?:\[(?P<extras>[^\]]*)\])?
        \s*
        (?P<spec>\(?\s*(?:[<>=!~]=?|===)[^;]*?\)?)?
        \s*
        (?:;\s*(?P<marker>.*?))?
        \s*$",
    )
    .expect("requirement pattern is valid")
});

static EXTRA_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bextra\s*==\s*['"]([^'"]+)['"]"#).expect("extra marker pattern is valid")
});

/// One parsed requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Comma-joined specifiers in sorted order, empty when unconstrained
    pub version_spec: String,
    pub extras: Vec<String>,
    pub environment_marker: Option<String>,
}

impl Dependency {
    /// Name of the extra this dependency belongs to, if its marker names one.
    pub fn extra(&self) -> Option<&str> {
        let marker = self.environment_marker.as_deref()?;
        EXTRA_MARKER_RE
            .captures(marker)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// True when the marker points at development tooling.
    pub fn is_development(&self) -> bool {
        self.environment_marker
            .as_deref()
            .is_some_and(|marker| ["dev", "test", "lint"].iter().any(|tag| marker.contains(tag)))
    }
}

/// Parses a single requirement string.
///
/// Strings the grammar does not cover (direct URL references, stray
/// punctuation) keep only their first word, normalized, as the name.
pub fn parse_requirement(requirement: &str) -> Dependency {
    match REQUIREMENT_RE.captures(requirement) {
        Some(caps) => {
            let mut extras: Vec<String> = caps
                .name("extras")
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|extra| !extra.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            extras.sort();
            extras.dedup();

            Dependency {
                name: caps["name"].to_string(),
                version_spec: caps
                    .name("spec")
                    .map(|m| canonical_specifier(m.as_str()))
                    .unwrap_or_default(),
                extras,
                environment_marker: caps
                    .name("marker")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|marker| !marker.is_empty()),
            }
        }
        None => Dependency {
            name: normalize_package_name(
                requirement.split_whitespace().next().unwrap_or(requirement),
            ),
            version_spec: String::new(),
            extras: Vec::new(),
            environment_marker: None,
        },
    }
}

/// Parses every non-blank requirement string.
pub fn parse_requirements<S: AsRef<str>>(requirements: &[S]) -> Vec<Dependency> {
    requirements
        .iter()
        .map(|requirement| requirement.as_ref())
        .filter(|requirement| !requirement.trim().is_empty())
        .map(parse_requirement)
        .collect()
}

/// `(>= 1.0 , <2)` becomes `<2,>=1.0`.
fn canonical_specifier(raw: &str) -> String {
    let inner = raw
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');
    let mut clauses: Vec<String> = inner
        .split(',')
        .map(|clause| clause.split_whitespace().collect::<String>())
        .filter(|clause| !clause.is_empty())
        .collect();
    clauses.sort();
    clauses.join(",")
}
