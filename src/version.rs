//! Version Module
//!
//! PEP 440 version parsing, ordering and classification.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("version pattern is valid")
});

/// Pre-release phase, ordered alpha < beta < release candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

/// Sort key component with explicit infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bound<T> {
    Low,
    At(T),
    High,
}

// == Version ==
/// A parsed PEP 440 version.
#[derive(Debug, Clone)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<String>,
}

impl Version {
    /// Parses a version string, returning None if it is not PEP 440.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(input)?;
        let number = |name: &str| -> Option<Option<u64>> {
            match caps.name(name) {
                Some(m) => m.as_str().parse().ok().map(Some),
                None => Some(None),
            }
        };

        let release = caps
            .name("release")?
            .as_str()
            .split('.')
            .map(|part| part.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let phase = match label.as_str().to_ascii_lowercase().as_str() {
                    "a" | "alpha" => PreRelease::Alpha,
                    "b" | "beta" => PreRelease::Beta,
                    _ => PreRelease::Rc,
                };
                Some((phase, number("pre_n")?.unwrap_or(0)))
            }
            None => None,
        };

        let post = match (number("post_n1")?, caps.name("post_l")) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => Some(number("post_n2")?.unwrap_or(0)),
            (None, None) => None,
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(number("dev_n")?.unwrap_or(0)),
            None => None,
        };

        Some(Self {
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }

    /// True for alpha, beta, rc and dev releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_devrelease(&self) -> bool {
        self.dev.is_some()
    }

    fn sort_key(&self) -> (u64, &[u64], Bound<(PreRelease, u64)>, Bound<u64>, Bound<u64>, Option<&str>) {
        let significant = self
            .release
            .iter()
            .rposition(|&part| part != 0)
            .map_or(0, |idx| idx + 1);

        // A bare dev release sorts before any pre-release of the same version.
        let pre = match (self.pre, self.post, self.dev) {
            (Some(pre), _, _) => Bound::At(pre),
            (None, None, Some(_)) => Bound::Low,
            _ => Bound::High,
        };
        let post = self.post.map_or(Bound::Low, Bound::At);
        let dev = self.dev.map_or(Bound::High, Bound::At);

        (
            self.epoch,
            &self.release[..significant],
            pre,
            post,
            dev,
            self.local.as_deref(),
        )
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Compares two version strings, falling back to plain string order when
/// either side is not a valid version.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

/// Sorts newest first. If any entry is unparsable the whole list is sorted
/// by string instead, keeping the comparator a total order.
pub fn sort_versions_desc(versions: &mut [String]) {
    let parsed: Option<Vec<Version>> = versions.iter().map(|v| Version::parse(v)).collect();
    match parsed {
        Some(parsed) => {
            let mut pairs: Vec<(Version, String)> =
                parsed.into_iter().zip(versions.iter().cloned()).collect();
            pairs.sort_by(|a, b| b.0.cmp(&a.0));
            for (slot, (_, version)) in versions.iter_mut().zip(pairs) {
                *slot = version;
            }
        }
        None => versions.sort_by(|a, b| b.cmp(a)),
    }
}

/// Release channel of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Stable,
    PreRelease,
    Development,
}

impl VersionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionKind::Stable => "stable",
            VersionKind::PreRelease => "pre-release",
            VersionKind::Development => "development",
        }
    }
}

/// Classifies a version; unparsable strings are judged by common markers.
pub fn classify_version(version: &str) -> VersionKind {
    match Version::parse(version) {
        Some(v) if v.is_devrelease() => VersionKind::Development,
        Some(v) if v.is_prerelease() => VersionKind::PreRelease,
        Some(_) => VersionKind::Stable,
        None => {
            let lower = version.to_ascii_lowercase();
            if ["alpha", "beta", "rc", "dev", "pre"]
                .iter()
                .any(|marker| lower.contains(marker))
            {
                VersionKind::PreRelease
            } else {
                VersionKind::Stable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let version = v("1!2.3.4rc5.post6.dev7+ubuntu.1");
        assert_eq!(version.epoch, 1);
        assert_eq!(version.release, vec![2, 3, 4]);
        assert_eq!(version.pre, Some((PreRelease::Rc, 5)));
        assert_eq!(version.post, Some(6));
        assert_eq!(version.dev, Some(7));
        assert_eq!(version.local.as_deref(), Some("ubuntu.1"));
    }

    #[test]
    fn test_parse_alternate_spellings() {
        assert_eq!(v("1.0-alpha1").pre, Some((PreRelease::Alpha, 1)));
        assert_eq!(v("1.0.beta").pre, Some((PreRelease::Beta, 0)));
        assert_eq!(v("1.0c2").pre, Some((PreRelease::Rc, 2)));
        assert_eq!(v("1.0-3").post, Some(3));
        assert_eq!(v("1.0.rev").post, Some(0));
        assert_eq!(v("v2.0").release, vec![2, 0]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "1.0.0.", "1..0", "1.0+", "latest"] {
            assert!(Version::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_ordering() {
        let ordered = [
            "1.0.dev0", "1.0a1", "1.0a2.dev1", "1.0a2", "1.0b1", "1.0rc1", "1.0", "1.0+local",
            "1.0.post1.dev0", "1.0.post1", "1.1", "1.10", "1!0.1",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(compare_versions("2", "2.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_falls_back_to_strings() {
        assert_eq!(compare_versions("banana", "apple"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "latest"), Ordering::Less);
    }

    #[test]
    fn test_sort_versions_desc() {
        let mut versions: Vec<String> = ["1.9", "1.10", "1.10rc1", "0.9"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_versions_desc(&mut versions);
        assert_eq!(versions, vec!["1.10", "1.10rc1", "1.9", "0.9"]);
    }

    #[test]
    fn test_sort_versions_desc_string_fallback() {
        let mut versions: Vec<String> = ["1.9", "1.10", "nightly"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_versions_desc(&mut versions);
        assert_eq!(versions, vec!["nightly", "1.9", "1.10"]);
    }

    #[test]
    fn test_classify_version() {
        assert_eq!(classify_version("2.31.0"), VersionKind::Stable);
        assert_eq!(classify_version("2.0b3"), VersionKind::PreRelease);
        assert_eq!(classify_version("2.0.dev4"), VersionKind::Development);
        assert_eq!(classify_version("2.0.post1"), VersionKind::Stable);
        assert_eq!(classify_version("nightly-beta"), VersionKind::PreRelease);
        assert_eq!(classify_version("nightly"), VersionKind::Stable);
    }
}
