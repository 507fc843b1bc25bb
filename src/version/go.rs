//! Go release version model
//!
//! Go names its releases `go{major}[.{minor}[.{patch}]]{prerelease}`:
//! - `go1`, `go1.15`, `go1.15.3` - stable releases
//! - `go1.16rc1`, `go1.9beta2`, `go1.9.2rc2` - prereleases
//!
//! Missing minor/patch components are treated as 0, so `go1.2 == go1.2.0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::error::VersionError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^go(\d+)(?:\.(\d+))?(?:\.(\d+))?([[:alnum:]]+)?$").unwrap()
});

/// A parsed Go release version.
///
/// Ordering, equality and hashing only look at the numeric components and the
/// prerelease tag. The string the version was parsed from is kept for display.
#[derive(Debug, Clone)]
pub struct GoVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: String,
    original: String,
}

impl GoVersion {
    /// Parse a Go version with or without the leading `go`.
    ///
    /// Examples:
    /// - "go1.16rc1" -> (1, 16, 0, "rc1")
    /// - "1.15.3" -> (1, 15, 3, "")
    /// - "go2" -> (2, 0, 0, "")
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let prefixed = if raw.starts_with("go") {
            raw.to_string()
        } else {
            format!("go{}", raw)
        };

        let caps = VERSION_RE
            .captures(&prefixed)
            .ok_or_else(|| VersionError::InvalidGoVersion(raw.to_string()))?;

        let number = |idx: usize| -> Result<u64, VersionError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::InvalidGoVersion(raw.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: caps
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            original: raw.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Prerelease tag such as `rc1` or `beta2`; empty for stable releases.
    pub fn prerelease(&self) -> &str {
        &self.prerelease
    }

    /// The string this version was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// A release is stable when it carries no prerelease tag.
    pub fn is_stable(&self) -> bool {
        self.prerelease.is_empty()
    }

    pub fn less_than(&self, other: &Self) -> bool {
        self < other
    }

    pub fn greater_than(&self, other: &Self) -> bool {
        self > other
    }

    pub fn equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Build a version from already validated components.
    pub(crate) fn from_parts(major: u64, minor: u64, patch: u64, prerelease: &str) -> Self {
        let mut version = Self {
            major,
            minor,
            patch,
            prerelease: prerelease.to_string(),
            original: String::new(),
        };
        version.original = version.to_string();
        version
    }

    /// Compare only the numeric components.
    pub(crate) fn cmp_numbers(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_numbers(other).then_with(|| {
            match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.prerelease.cmp(&other.prerelease),
            }
        })
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GoVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GoVersion {}

impl Hash for GoVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch != 0 {
            write!(
                f,
                "go{}.{}.{}{}",
                self.major, self.minor, self.patch, self.prerelease
            )
        } else if self.minor != 0 {
            write!(f, "go{}.{}{}", self.major, self.minor, self.prerelease)
        } else {
            write!(f, "go{}{}", self.major, self.prerelease)
        }
    }
}

impl FromStr for GoVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for GoVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GoVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("go1.16rc1", "go1.16rc1")]
    #[case("1.16rc1", "go1.16rc1")]
    #[case("go1", "go1")]
    #[case("go1.15", "go1.15")]
    #[case("go2rc1", "go2rc1")]
    #[case("go1.15.3", "go1.15.3")]
    #[case("go1.0", "go1")] // zero minor is not rendered
    #[case("go1.0.1", "go1.0.1")]
    #[case("go1.9.2rc2", "go1.9.2rc2")]
    fn parse_renders_canonical_form(#[case] input: &str, #[case] expected: &str) {
        let version = GoVersion::parse(input).unwrap();
        assert_eq!(version.to_string(), expected);
        assert_eq!(version.original(), input);
    }

    #[rstest]
    #[case("v1.16rc1")]
    #[case("")]
    #[case("go")]
    #[case("go1.15.x")]
    #[case("go1.2.3.4")]
    #[case("go1.15-rc1")]
    #[case("99999999999999999999999")]
    fn parse_rejects_invalid_versions(#[case] input: &str) {
        assert!(matches!(
            GoVersion::parse(input),
            Err(VersionError::InvalidGoVersion(_))
        ));
    }

    #[test]
    fn parse_extracts_components() {
        let version = GoVersion::parse("go1.9.2rc2").unwrap();
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 9);
        assert_eq!(version.patch(), 2);
        assert_eq!(version.prerelease(), "rc2");
        assert!(!version.is_stable());
    }

    #[rstest]
    #[case("1.15rc1", "1.15")]
    #[case("1.16", "2.0")]
    #[case("1.9beta2", "1.9rc1")]
    #[case("1.9", "1.9.1")]
    #[case("1.9.9", "1.10")]
    #[case("1.10beta1", "1.10beta2")]
    fn less_than_orders_versions(#[case] lower: &str, #[case] higher: &str) {
        let lower = GoVersion::parse(lower).unwrap();
        let higher = GoVersion::parse(higher).unwrap();
        assert!(lower.less_than(&higher));
        assert!(higher.greater_than(&lower));
        assert!(!lower.equal(&higher));
    }

    #[test]
    fn equal_ignores_original_spelling() {
        let short = GoVersion::parse("1.2").unwrap();
        let long = GoVersion::parse("go1.2.0").unwrap();
        assert!(short.equal(&long));
        assert_eq!(short.cmp(&long), Ordering::Equal);
    }

    #[test]
    fn ordering_is_a_strict_total_order() {
        let versions: Vec<GoVersion> = [
            "go1", "go1.0.1", "go1.2rc1", "go1.2", "go1.2.0", "go1.9beta2", "go1.9rc1", "go1.9",
            "go1.10", "go2rc1", "go2",
        ]
        .iter()
        .map(|v| GoVersion::parse(v).unwrap())
        .collect();

        for a in &versions {
            assert!(!a.less_than(a));
            for b in &versions {
                let relations = [a.less_than(b), a.equal(b), a.greater_than(b)];
                assert_eq!(relations.iter().filter(|r| **r).count(), 1);
                for c in &versions {
                    if a.less_than(b) && b.less_than(c) {
                        assert!(a.less_than(c));
                    }
                }
            }
        }
    }

    #[rstest]
    #[case("1.16rc1")]
    #[case("go1.0")]
    #[case("go1.15.3")]
    #[case("2beta1")]
    fn canonical_string_parses_back_to_equal_version(#[case] input: &str) {
        let version = GoVersion::parse(input).unwrap();
        let reparsed = GoVersion::parse(&version.to_string()).unwrap();
        assert_eq!(reparsed, version);
    }

    #[test]
    fn serializes_as_canonical_string() {
        let version: GoVersion = serde_json::from_str("\"1.16rc1\"").unwrap();
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"go1.16rc1\"");
    }
}
