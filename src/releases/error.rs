use thiserror::Error;

use crate::version::VersionError;

/// Failure talking to one of the upstream sources
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A storage object name that matches none of the known release file patterns
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no match for {0:?}")]
pub struct ClassificationError(pub String);

/// Failure while building the release catalog. No partial catalog is ever
/// returned alongside one of these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error building http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("error retrieving storage objects: {0}")]
    Listing(#[source] UpstreamError),

    #[error("error retrieving release feed: {0}")]
    Feed(#[source] UpstreamError),

    #[error("error building release files: {0}")]
    Classification(#[from] ClassificationError),

    #[error("error getting checksum for {filename}: {source}")]
    Checksum {
        filename: String,
        #[source]
        source: UpstreamError,
    },

    #[error("error building releases: {0}")]
    Version(#[from] VersionError),
}

/// Failure loading a catalog snapshot from disk
#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error("error reading file {path:?}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error unmarshaling file {path:?}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
