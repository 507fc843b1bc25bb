//! Release file name classification
//!
//! Object names in the release bucket follow one of three shapes:
//! - Installer: `go1.15.darwin-amd64.pkg`, `go1.4.2.darwin-amd64-osx10.8.pkg`,
//!   `go1.15.windows-386.msi`
//! - Archive: `go1.15.linux-amd64.tar.gz`, `go1.15.windows-amd64.zip`
//! - Source: `go1.15.src.tar.gz`
//!
//! Sidecar files (`.asc`, `.sha256`) and bootstrap toolchains are not release
//! files; use [`is_ignorable`] to drop them before classifying.

use std::sync::LazyLock;

use regex::Regex;

use crate::releases::error::ClassificationError;
use crate::releases::types::FileKind;

static INSTALLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\Ago(\d+(?:\.\d+)?(?:\.\d+)?(?:\w[[:alnum:]]*)?)\.([[:alnum:]]+)-([[:alnum:]]+)(?:-osx10\.\d)?((?:\..+)?(?:\.msi|\.pkg))\z").unwrap()
});

static ARCHIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\Ago(\d+(?:\.\d+)?(?:\.\d+)?(?:\w[[:alnum:]]*)?)\.([[:alnum:]]+)-([[:alnum:]]+)(?:-osx10\.\d)?(\..+)\z").unwrap()
});

static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\Ago(\d+(?:\.\d+)?(?:\.\d+)?(?:\w[[:alnum:]]*)?)(\.src.tar.gz.*)\z").unwrap()
});

static IGNORABLE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\.asc\z", r"\.sha256\z", r"-bootstrap-"]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

/// Fields extracted from a release file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameInfo {
    pub name: String,
    /// Version without the leading `go`, e.g. `1.16rc1`
    pub version: String,
    pub kind: FileKind,
    /// Empty for source archives
    pub os: String,
    /// Empty for source archives
    pub arch: String,
    pub suffix: String,
}

/// Returns true for objects that are not release files themselves
pub fn is_ignorable(name: &str) -> bool {
    IGNORABLE_RES.iter().any(|re| re.is_match(name))
}

/// Classify a release file name.
///
/// Patterns are tried in order (installer, archive, source); the first match
/// wins.
pub fn classify(name: &str) -> Result<FilenameInfo, ClassificationError> {
    if let Some(caps) = INSTALLER_RE.captures(name) {
        return Ok(FilenameInfo {
            name: name.to_string(),
            version: caps[1].to_string(),
            kind: FileKind::Installer,
            os: caps[2].to_string(),
            arch: caps[3].to_string(),
            suffix: caps[4].to_string(),
        });
    }

    if let Some(caps) = ARCHIVE_RE.captures(name) {
        return Ok(FilenameInfo {
            name: name.to_string(),
            version: caps[1].to_string(),
            kind: FileKind::Archive,
            os: caps[2].to_string(),
            arch: caps[3].to_string(),
            suffix: caps[4].to_string(),
        });
    }

    if let Some(caps) = SOURCE_RE.captures(name) {
        return Ok(FilenameInfo {
            name: name.to_string(),
            version: caps[1].to_string(),
            kind: FileKind::Source,
            os: String::new(),
            arch: String::new(),
            suffix: caps[2].to_string(),
        });
    }

    Err(ClassificationError(name.to_string()))
}
