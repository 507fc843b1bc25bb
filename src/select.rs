//! Selecting matching Go versions from a list of candidates

use std::io::BufRead;

use thiserror::Error;

use crate::version::{Constraints, GoVersion, VersionError};

/// Candidate argument that reads candidates from stdin instead
pub const STDIN_MARKER: &str = "-";

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("could not parse version {candidate:?}: {source}")]
    InvalidCandidate {
        candidate: String,
        #[source]
        source: VersionError,
    },

    #[error("error reading candidates: {0}")]
    Read(#[from] std::io::Error),
}

/// Parse candidate versions from `args`, one per argument.
///
/// Arguments are read up to the first `-`, after which candidates are read
/// line by line from `stdin` and any remaining arguments are ignored.
/// Invalid candidates fail the whole read unless `ignore_invalid` is set.
pub fn read_candidates<R: BufRead>(
    args: &[String],
    stdin: R,
    ignore_invalid: bool,
) -> Result<Vec<GoVersion>, SelectError> {
    let mut versions = Vec::with_capacity(args.len());

    let mut read_stdin = false;
    for arg in args {
        if arg == STDIN_MARKER {
            read_stdin = true;
            break;
        }
        push_candidate(&mut versions, arg, ignore_invalid)?;
    }

    if read_stdin {
        for line in stdin.lines() {
            push_candidate(&mut versions, &line?, ignore_invalid)?;
        }
    }

    Ok(versions)
}

fn push_candidate(
    versions: &mut Vec<GoVersion>,
    candidate: &str,
    ignore_invalid: bool,
) -> Result<(), SelectError> {
    match GoVersion::parse(candidate) {
        Ok(version) => versions.push(version),
        Err(_) if ignore_invalid => {}
        Err(source) => {
            return Err(SelectError::InvalidCandidate {
                candidate: candidate.to_string(),
                source,
            });
        }
    }
    Ok(())
}

/// Versions satisfying `constraints`, newest first, in canonical form.
///
/// At most `max_results` entries are returned when it is non-zero.
pub fn select(constraints: &Constraints, max_results: usize, versions: &[GoVersion]) -> Vec<String> {
    let mut matching = constraints.filter(versions);
    matching.sort_by(|a, b| b.cmp(a));
    if max_results > 0 {
        matching.truncate(max_results);
    }
    matching.iter().map(|v| v.to_string()).collect()
}
