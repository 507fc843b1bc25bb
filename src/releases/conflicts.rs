//! Merge conflict detection between two catalog snapshots
//!
//! A head catalog can replace a base catalog automatically when every base
//! release is still present in head and unchanged. New releases in head are
//! fine.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use similar::TextDiff;
use tracing::debug;

use crate::releases::assembler::sort_files;
use crate::releases::catalog::load_catalog;
use crate::releases::error::CatalogFileError;
use crate::releases::types::Release;

/// Outcome of comparing two catalog files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    /// True when head can be merged into base
    pub ok: bool,
    /// Conflict messages joined by newlines, empty when `ok`
    pub message: String,
}

/// Returns every conflict that prevents merging `head` into `base`.
///
/// Base problems come first, in base order, followed by head problems.
pub fn find_conflicts(base: &[Release], head: &[Release]) -> Vec<String> {
    let mut messages = Vec::new();

    let mut head_releases: HashMap<&str, &Release> = HashMap::new();
    for release in head {
        head_releases.entry(release.version.as_str()).or_insert(release);
    }

    let mut base_seen = HashSet::new();
    for base_release in base {
        if let Some(message) = identity_problem("base", base_release, &mut base_seen) {
            messages.push(message);
            continue;
        }

        let version = base_release.version.as_str();
        let Some(head_release) = head_releases.get(version) else {
            messages.push(format!("head is missing release {:?}", version));
            continue;
        };

        let base_release = normalized(base_release);
        let head_release = normalized(head_release);
        if base_release != head_release {
            messages.push(format!(
                "release {:?} differs:\n{}",
                version,
                release_diff(&base_release, &head_release)
            ));
        }
    }

    let mut head_seen = HashSet::new();
    for head_release in head {
        if let Some(message) = identity_problem("head", head_release, &mut head_seen) {
            messages.push(message);
        }
    }

    debug!("Found {} conflicts", messages.len());
    messages
}

/// Load two catalogs from disk and compare them.
pub fn check_conflict_files(
    base_path: impl AsRef<Path>,
    head_path: impl AsRef<Path>,
) -> Result<ConflictReport, CatalogFileError> {
    let base = load_catalog(base_path.as_ref())?;
    let head = load_catalog(head_path.as_ref())?;

    let conflicts = find_conflicts(&base, &head);
    Ok(ConflictReport {
        ok: conflicts.is_empty(),
        message: conflicts.join("\n"),
    })
}

/// Empty or repeated versions. Only the first release of a version is
/// compared.
fn identity_problem<'a>(
    side: &str,
    release: &'a Release,
    seen: &mut HashSet<&'a str>,
) -> Option<String> {
    if release.version.is_empty() {
        return Some(format!("{} has a release with no version", side));
    }
    if !seen.insert(release.version.as_str()) {
        return Some(format!(
            "{} has multiple releases with version {:?}",
            side, release.version
        ));
    }
    None
}

fn normalized(release: &Release) -> Release {
    let mut release = release.clone();
    sort_files(&mut release.files);
    release
}

fn release_diff(base: &Release, head: &Release) -> String {
    let base_json = pretty(base);
    let head_json = pretty(head);
    TextDiff::from_lines(&base_json, &head_json)
        .unified_diff()
        .header("base", "head")
        .to_string()
}

fn pretty(release: &Release) -> String {
    serde_json::to_string_pretty(release).unwrap_or_else(|_| format!("{:#?}", release))
}
