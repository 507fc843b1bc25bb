//! Upstream traits for the release bucket and the release feed

#[cfg(test)]
use mockall::automock;

use crate::releases::error::UpstreamError;
use crate::releases::types::{FeedRelease, StorageObject};

/// Lists the raw objects stored in the release bucket
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ObjectListing: Send + Sync {
    /// Fetches every object under the configured prefix, following pagination.
    ///
    /// Objects are returned in upstream order across all pages.
    async fn list_objects(&self) -> Result<Vec<StorageObject>, UpstreamError>;
}

/// Fetches the published checksum of a single release file
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ChecksumSource: Send + Sync {
    /// Returns the hex sha256 of `filename`.
    ///
    /// A missing checksum object resolves to an empty string, not an error.
    async fn fetch_checksum(&self, filename: &str) -> Result<String, UpstreamError>;
}

/// Secondary release feed used as a checksum lookup table
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseFeed: Send + Sync {
    async fn fetch_releases(&self) -> Result<Vec<FeedRelease>, UpstreamError>;
}
