//! Grouping of release files into sorted releases

use std::cmp::Reverse;
use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::releases::error::{ClassificationError, FetchError};
use crate::releases::filename::{classify, is_ignorable};
use crate::releases::types::{Release, ReleaseFile, StorageObject};
use crate::version::{GoVersion, VersionError};

/// Turn bucket objects into release files without checksums.
///
/// Sidecar and bootstrap objects are dropped, every other object must
/// classify, and files of skipped versions (`go`-prefixed) are left out.
pub fn build_release_files(
    objects: &[StorageObject],
    skip_versions: &HashSet<String>,
) -> Result<Vec<ReleaseFile>, ClassificationError> {
    let mut files = Vec::with_capacity(objects.len());

    for object in objects {
        if is_ignorable(&object.name) {
            continue;
        }
        let info = classify(&object.name)?;
        let version = format!("go{}", info.version);
        if skip_versions.contains(&version) {
            debug!("Skipping {} (version {} excluded)", object.name, version);
            continue;
        }
        files.push(ReleaseFile {
            filename: info.name,
            os: info.os,
            arch: info.arch,
            version,
            sha256: String::new(),
            size: object.size(),
            kind: info.kind,
        });
    }

    Ok(files)
}

/// Group release files into releases.
///
/// Files of skipped versions are dropped. Releases come out newest first and
/// each release lists its files by (version, filename) descending, so the
/// result does not depend on the input order.
pub fn assemble(
    files: Vec<ReleaseFile>,
    skip_versions: &HashSet<String>,
) -> Result<Vec<Release>, FetchError> {
    let mut files: Vec<ReleaseFile> = files
        .into_iter()
        .filter(|f| !skip_versions.contains(&f.version))
        .collect();

    // Ordering unparsable versions would be arbitrary; reject them instead.
    for file in &files {
        GoVersion::parse(&file.version)?;
    }
    sort_files(&mut files);
    files.reverse();

    let mut grouped: IndexMap<String, Vec<ReleaseFile>> = IndexMap::new();
    for file in files {
        grouped.entry(file.version.clone()).or_default().push(file);
    }

    let mut releases = grouped
        .into_iter()
        .map(|(version, files)| {
            let stable = GoVersion::parse(&version)?.is_stable();
            Ok(Release {
                version,
                stable,
                files,
            })
        })
        .collect::<Result<Vec<_>, VersionError>>()?;
    sort_releases(&mut releases);

    debug!("Assembled {} releases", releases.len());
    Ok(releases)
}

/// Sort files ascending by (version, filename).
///
/// Unparsable versions sort before every valid one so that arbitrary
/// catalogs can still be normalized deterministically.
pub fn sort_files(files: &mut [ReleaseFile]) {
    files.sort_by_cached_key(|f| {
        (
            GoVersion::parse(&f.version).ok(),
            f.version.clone(),
            f.filename.clone(),
        )
    });
}

/// Sort releases newest first, the order [`assemble`] produces
pub fn sort_releases(releases: &mut [Release]) {
    releases.sort_by_cached_key(|r| {
        Reverse((GoVersion::parse(&r.version).ok(), r.version.clone()))
    });
}
