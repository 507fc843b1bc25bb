//! Public catalog shapes

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of downloadable file in a Go release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// `.msi` / `.pkg` installers
    Installer,
    /// OS/arch qualified archives such as `.tar.gz` or `.zip`
    Archive,
    /// `go{version}.src.tar.gz`
    Source,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Installer => "installer",
            FileKind::Archive => "archive",
            FileKind::Source => "source",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file included in a Go release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub os: String,
    pub arch: String,
    /// Go version with the `go` prefix, e.g. `go1.16rc1`
    pub version: String,
    pub sha256: String,
    pub size: i64,
    pub kind: FileKind,
}

/// A Go release and all of its files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    pub stable: bool,
    pub files: Vec<ReleaseFile>,
}

/// A release as published in the golang.org/dl feed.
///
/// The feed only serves as a checksum lookup table, so every field is
/// optional and `kind` is kept as free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedRelease {
    pub version: String,
    pub stable: bool,
    pub files: Vec<FeedFile>,
}

/// A file entry of a [`FeedRelease`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedFile {
    pub filename: String,
    pub os: String,
    pub arch: String,
    pub version: String,
    pub sha256: String,
    pub size: i64,
    pub kind: String,
}

/// An object in the release bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObject {
    pub name: String,
    #[serde(default)]
    pub etag: String,
    /// Decimal byte count; the listing API encodes it as a string
    #[serde(default)]
    pub size: String,
    pub time_created: Option<DateTime<Utc>>,
}

impl StorageObject {
    /// Object size in bytes, 0 when the listing value is not a number
    pub fn size(&self) -> i64 {
        self.size.parse().unwrap_or(0)
    }
}
