//! Package report DTOs
//!
//! Views computed from a cached [`PackageInfo`]: version comparison,
//! dependency breakdown and vulnerability assessment.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{PackageInfo, Vulnerability};
use crate::requirement::{parse_requirements, Dependency};
use crate::version::{classify_version, compare_versions};

// == Version Comparison ==

/// One side of a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSummary {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Upload time of the release's first file
    pub upload_time: Option<DateTime<Utc>>,
    pub dependencies_count: usize,
    pub vulnerabilities_count: usize,
}

impl VersionSummary {
    pub fn new(version: &str, package: &PackageInfo) -> Self {
        Self {
            version: version.to_string(),
            kind: classify_version(version).as_str(),
            upload_time: package.urls.first().and_then(|file| file.upload_time),
            dependencies_count: package.info.requires_dist.len(),
            vulnerabilities_count: package.vulnerabilities.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    /// -1, 0 or 1 as version1 is older, equal or newer
    pub result: i8,
    /// The newer version string, or "equal"
    pub newer_version: String,
    pub is_upgrade: bool,
    pub is_downgrade: bool,
}

/// Response body for `GET /packages/:name/compare`
#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub package_name: String,
    pub version1: VersionSummary,
    pub version2: VersionSummary,
    pub comparison: VersionComparison,
}

impl CompareResponse {
    pub fn new(
        package_name: impl Into<String>,
        (version1, package1): (&str, &PackageInfo),
        (version2, package2): (&str, &PackageInfo),
    ) -> Self {
        let ordering = compare_versions(version1, version2);
        let newer_version = match ordering {
            Ordering::Greater => version1,
            Ordering::Less => version2,
            Ordering::Equal => "equal",
        };

        Self {
            package_name: package_name.into(),
            version1: VersionSummary::new(version1, package1),
            version2: VersionSummary::new(version2, package2),
            comparison: VersionComparison {
                result: ordering as i8,
                newer_version: newer_version.to_string(),
                is_upgrade: ordering.is_gt(),
                is_downgrade: ordering.is_lt(),
            },
        }
    }
}

// == Dependencies ==

/// Response body for `GET /packages/:name/dependencies`
#[derive(Debug, Clone, Serialize)]
pub struct DependenciesResponse {
    pub package_name: String,
    pub package_version: String,
    pub total_dependencies: usize,
    pub runtime_dependencies: Vec<Dependency>,
    pub development_dependencies: Vec<Dependency>,
    pub available_extras: Vec<String>,
    /// Dependencies keyed by extra, present only when asked for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_dependencies: Option<BTreeMap<String, Vec<Dependency>>>,
}

impl DependenciesResponse {
    /// Splits `requires_dist` into runtime, development and per-extra lists.
    ///
    /// A marker naming an extra wins over one that looks like dev tooling.
    pub fn new(package: &PackageInfo, include_extras: bool) -> Self {
        let dependencies = parse_requirements(&package.info.requires_dist);
        let total_dependencies = dependencies.len();

        let mut runtime = Vec::new();
        let mut development = Vec::new();
        let mut optional: BTreeMap<String, Vec<Dependency>> = BTreeMap::new();

        for dependency in dependencies {
            if let Some(extra) = dependency.extra() {
                optional
                    .entry(extra.to_string())
                    .or_default()
                    .push(dependency);
            } else if dependency.is_development() {
                development.push(dependency);
            } else {
                runtime.push(dependency);
            }
        }

        Self {
            package_name: package.info.name.clone(),
            package_version: package.info.version.clone(),
            total_dependencies,
            runtime_dependencies: runtime,
            development_dependencies: development,
            available_extras: package.info.provides_extra.clone(),
            optional_dependencies: include_extras.then_some(optional),
        }
    }
}

// == Vulnerabilities ==

/// Advisory severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Severity::Critical,
            70..=84 => Severity::High,
            50..=69 => Severity::Medium,
            35..=49 => Severity::Low,
            _ => Severity::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

const BASE_SCORE: u8 = 40;
const CVE_SCORE: u8 = 75;
const UNPATCHED_SCORE: u8 = 80;
const KEYWORD_SCORES: [(&str, u8); 6] = [
    ("critical", 90),
    ("high", 75),
    ("medium", 55),
    ("low", 40),
    ("important", 70),
    ("severe", 80),
];

/// Heuristic 0-100 score for an advisory.
///
/// Each signal raises the floor: a CVE alias, a severity word in the summary
/// or details, and the lack of any fixed release.
pub fn severity_score(vulnerability: &Vulnerability) -> u8 {
    let text = format!("{} {}", vulnerability.summary, vulnerability.details).to_lowercase();
    let mut score = BASE_SCORE;

    if vulnerability
        .aliases
        .iter()
        .any(|alias| alias.starts_with("CVE-"))
    {
        score = score.max(CVE_SCORE);
    }
    for (keyword, keyword_score) in KEYWORD_SCORES {
        if text.contains(keyword) {
            score = score.max(keyword_score);
        }
    }
    if vulnerability.fixed_in.is_empty() {
        score = score.max(UNPATCHED_SCORE);
    }
    score
}

/// One advisory with its assessment.
#[derive(Debug, Clone, Serialize)]
pub struct VulnerabilityReport {
    #[serde(flatten)]
    pub advisory: Vulnerability,
    pub severity: Severity,
    pub severity_score: u8,
    pub recommendation: String,
}

impl From<&Vulnerability> for VulnerabilityReport {
    fn from(vulnerability: &Vulnerability) -> Self {
        let score = severity_score(vulnerability);
        let recommendation = if vulnerability.fixed_in.is_empty() {
            "Monitor for fixes; no patched versions listed".to_string()
        } else {
            format!("Update to one of: {}", vulnerability.fixed_in.join(", "))
        };

        Self {
            advisory: vulnerability.clone(),
            severity: Severity::from_score(score),
            severity_score: score,
            recommendation,
        }
    }
}

/// Response body for `GET /packages/:name/vulnerabilities`
#[derive(Debug, Clone, Serialize)]
pub struct VulnerabilitiesResponse {
    pub package_name: String,
    pub package_version: String,
    pub vulnerability_count: usize,
    pub has_vulnerabilities: bool,
    pub vulnerabilities: Vec<VulnerabilityReport>,
    pub severity_breakdown: BTreeMap<Severity, usize>,
    /// Band of the highest score, or "none"
    pub overall_severity: &'static str,
    pub overall_severity_score: u8,
    /// "vulnerable" or "secure"
    pub security_status: &'static str,
    pub recommendation: &'static str,
}

impl VulnerabilitiesResponse {
    pub fn new(package: &PackageInfo) -> Self {
        let reports: Vec<VulnerabilityReport> = package
            .vulnerabilities
            .iter()
            .map(VulnerabilityReport::from)
            .collect();

        let mut severity_breakdown = BTreeMap::new();
        for report in &reports {
            *severity_breakdown.entry(report.severity).or_insert(0) += 1;
        }
        let highest = reports.iter().map(|report| report.severity_score).max();
        let vulnerable = !reports.is_empty();

        Self {
            package_name: package.info.name.clone(),
            package_version: package.info.version.clone(),
            vulnerability_count: reports.len(),
            has_vulnerabilities: vulnerable,
            vulnerabilities: reports,
            severity_breakdown,
            overall_severity: highest.map_or("none", |score| Severity::from_score(score).as_str()),
            overall_severity_score: highest.unwrap_or(0),
            security_status: if vulnerable { "vulnerable" } else { "secure" },
            recommendation: if vulnerable {
                "Address the listed vulnerabilities"
            } else {
                "No known vulnerabilities"
            },
        }
    }
}
