//! End-to-end catalog fetch
//!
//! ```text
//! bucket listing ──► build_release_files ──► ChecksumFetcher ──► assemble
//!                                               ▲
//!                      release feed ────────────┘
//! ```

use std::collections::HashSet;

use tracing::info;

use crate::config::{CHECKSUM_CONCURRENCY, DEFAULT_SKIP_VERSIONS};
use crate::releases::assembler::{assemble, build_release_files};
use crate::releases::checksum::ChecksumFetcher;
use crate::releases::error::FetchError;
use crate::releases::source::{ChecksumSource, ObjectListing, ReleaseFeed};
use crate::releases::sources::golang_dl::DEFAULT_FEED_URL;
use crate::releases::sources::storage::{DEFAULT_BASE_URL, DEFAULT_BUCKET, DEFAULT_PREFIX};
use crate::releases::sources::{GolangDlFeed, StorageClient, http_client};
use crate::releases::types::Release;

/// Options for [`fetch_releases`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// HTTP client to use; a default client is built when `None`
    pub client: Option<reqwest::Client>,
    /// `go`-prefixed versions to leave out of the catalog
    pub skip_versions: HashSet<String>,
    pub storage_base_url: String,
    pub bucket: String,
    pub prefix: String,
    pub feed_url: String,
    pub checksum_concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            client: None,
            skip_versions: DEFAULT_SKIP_VERSIONS.iter().map(|v| v.to_string()).collect(),
            storage_base_url: DEFAULT_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            checksum_concurrency: CHECKSUM_CONCURRENCY,
        }
    }
}

/// Fetch the complete release catalog from the configured upstreams.
pub async fn fetch_releases(options: &FetchOptions) -> Result<Vec<Release>, FetchError> {
    let client = match &options.client {
        Some(client) => client.clone(),
        None => http_client().map_err(FetchError::Client)?,
    };

    let storage = StorageClient::new(
        client.clone(),
        &options.storage_base_url,
        &options.bucket,
        &options.prefix,
    );
    let feed = GolangDlFeed::new(client, &options.feed_url);

    fetch_releases_from(
        &storage,
        &storage,
        &feed,
        &options.skip_versions,
        options.checksum_concurrency,
    )
    .await
}

/// Run the fetch pipeline over arbitrary upstream sources.
pub async fn fetch_releases_from(
    listing: &dyn ObjectListing,
    checksums: &dyn ChecksumSource,
    feed: &dyn ReleaseFeed,
    skip_versions: &HashSet<String>,
    checksum_concurrency: usize,
) -> Result<Vec<Release>, FetchError> {
    let objects = listing.list_objects().await.map_err(FetchError::Listing)?;
    info!("Listed {} storage objects", objects.len());

    let mut files = build_release_files(&objects, skip_versions)?;
    info!("Built {} release files", files.len());

    let feed_releases = feed.fetch_releases().await.map_err(FetchError::Feed)?;
    ChecksumFetcher::new(checksums, checksum_concurrency)
        .fill(&mut files, &feed_releases)
        .await?;

    let releases = assemble(files, skip_versions)?;
    info!("Assembled {} releases", releases.len());
    Ok(releases)
}
