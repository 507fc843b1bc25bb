//! Checksum resolution for release files
//!
//! Checksums come from two places:
//! 1. The release feed, which already carries checksums for most files
//! 2. One `{filename}.sha256` request per remaining file, issued by a fixed
//!    pool of workers
//!
//! The first failed request stops the pool from claiming more work. Requests
//! already in flight finish, then the recorded failure is returned.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::CHECKSUM_CONCURRENCY;
use crate::releases::error::FetchError;
use crate::releases::source::ChecksumSource;
use crate::releases::types::{FeedRelease, ReleaseFile};

/// Build a filename -> sha256 lookup from feed releases, skipping files the
/// feed has no checksum for.
pub fn feed_checksums(releases: &[FeedRelease]) -> HashMap<String, String> {
    releases
        .iter()
        .flat_map(|release| release.files.iter())
        .filter(|file| !file.sha256.is_empty())
        .map(|file| (file.filename.clone(), file.sha256.clone()))
        .collect()
}

/// Fill missing checksums from the lookup table. Returns how many were filled.
pub fn apply_feed_checksums(files: &mut [ReleaseFile], checksums: &HashMap<String, String>) -> usize {
    let mut filled = 0;
    for file in files.iter_mut().filter(|f| f.sha256.is_empty()) {
        if let Some(sha) = checksums.get(&file.filename) {
            file.sha256 = sha.clone();
            filled += 1;
        }
    }
    filled
}

/// Resolves checksums that the feed did not provide
pub struct ChecksumFetcher<'a> {
    source: &'a dyn ChecksumSource,
    concurrency: usize,
}

impl<'a> ChecksumFetcher<'a> {
    pub fn new(source: &'a dyn ChecksumSource, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetcher using the default worker budget
    pub fn with_default_concurrency(source: &'a dyn ChecksumSource) -> Self {
        Self::new(source, CHECKSUM_CONCURRENCY)
    }

    /// Fill every missing checksum, first from `feed`, then from the source.
    pub async fn fill(
        &self,
        files: &mut [ReleaseFile],
        feed: &[FeedRelease],
    ) -> Result<(), FetchError> {
        let filled = apply_feed_checksums(files, &feed_checksums(feed));
        debug!("Release feed provided {} checksums", filled);
        self.fetch_missing(files).await
    }

    /// Fetch checksums for files that still have none.
    ///
    /// On failure no checksum is written back.
    pub async fn fetch_missing(&self, files: &mut [ReleaseFile]) -> Result<(), FetchError> {
        let pending: Vec<(usize, String)> = files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.sha256.is_empty())
            .map(|(i, f)| (i, f.filename.clone()))
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        let workers = self.concurrency.min(pending.len());
        info!(
            "Fetching {} checksums with {} workers",
            pending.len(),
            workers
        );

        let cursor = AtomicUsize::new(0);
        let failure = OnceLock::new();
        let results = join_all((0..workers).map(|_| self.worker(&pending, &cursor, &failure))).await;

        if let Some(err) = failure.into_inner() {
            return Err(err);
        }

        for (idx, sha) in results.into_iter().flatten() {
            files[idx].sha256 = sha;
        }
        Ok(())
    }

    /// Claim pending files one at a time until the queue is empty or a
    /// failure has been recorded.
    async fn worker(
        &self,
        pending: &[(usize, String)],
        cursor: &AtomicUsize,
        failure: &OnceLock<FetchError>,
    ) -> Vec<(usize, String)> {
        let mut resolved = Vec::new();

        while failure.get().is_none() {
            let Some((idx, filename)) = pending.get(cursor.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };

            match self.source.fetch_checksum(filename).await {
                Ok(sha) => resolved.push((*idx, sha)),
                Err(source) => {
                    warn!("Failed to fetch checksum for {}: {}", filename, source);
                    // Only the first failure is kept.
                    let _ = failure.set(FetchError::Checksum {
                        filename: filename.clone(),
                        source,
                    });
                    break;
                }
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releases::error::UpstreamError;
    use crate::releases::source::MockChecksumSource;
    use crate::releases::sources::StorageClient;
    use crate::releases::types::{FeedFile, FileKind};
    use mockito::Server;
    use std::time::Duration;

    fn file(filename: &str, sha256: &str) -> ReleaseFile {
        ReleaseFile {
            filename: filename.to_string(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            version: "go1.15".to_string(),
            sha256: sha256.to_string(),
            size: 1,
            kind: FileKind::Archive,
        }
    }

    fn feed(checksums: &[(&str, &str)]) -> Vec<FeedRelease> {
        vec![FeedRelease {
            version: "go1.15".to_string(),
            stable: true,
            files: checksums
                .iter()
                .map(|(filename, sha256)| FeedFile {
                    filename: filename.to_string(),
                    sha256: sha256.to_string(),
                    kind: "archive".to_string(),
                    ..Default::default()
                })
                .collect(),
        }]
    }

    fn numbered_files(count: usize) -> Vec<ReleaseFile> {
        (0..count).map(|i| file(&format!("f{}", i), "")).collect()
    }

    /// Checksum source that takes a while to answer and records how many
    /// requests overlap.
    #[derive(Default)]
    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        failing: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl ChecksumSource for SlowSource {
        async fn fetch_checksum(&self, filename: &str) -> Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.failing == Some(filename) {
                return Err(UpstreamError::InvalidResponse("boom".to_string()));
            }
            Ok(format!("sha-{}", filename))
        }
    }

    #[test]
    fn feed_checksums_skips_empty_entries() {
        let releases = feed(&[
            ("go1.15.linux-amd64.tar.gz", "aaa"),
            ("go1.15.src.tar.gz", ""),
        ]);

        let checksums = feed_checksums(&releases);

        assert_eq!(
            checksums,
            HashMap::from([("go1.15.linux-amd64.tar.gz".to_string(), "aaa".to_string())])
        );
    }

    #[test]
    fn apply_feed_checksums_keeps_existing_values() {
        let mut files = vec![
            file("go1.15.linux-amd64.tar.gz", ""),
            file("go1.15.darwin-amd64.tar.gz", "existing"),
            file("go1.15.src.tar.gz", ""),
        ];
        let checksums = HashMap::from([
            ("go1.15.linux-amd64.tar.gz".to_string(), "aaa".to_string()),
            ("go1.15.darwin-amd64.tar.gz".to_string(), "bbb".to_string()),
        ]);

        let filled = apply_feed_checksums(&mut files, &checksums);

        assert_eq!(filled, 1);
        assert_eq!(files[0].sha256, "aaa");
        assert_eq!(files[1].sha256, "existing");
        assert_eq!(files[2].sha256, "");
    }

    #[tokio::test]
    async fn fill_only_requests_files_missing_from_feed() {
        let mut server = Server::new_async().await;

        let from_feed = server
            .mock("GET", "/golang/go1.15.linux-amd64.tar.gz.sha256")
            .expect(0)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/golang/go1.15.darwin-amd64.tar.gz.sha256")
            .with_status(200)
            .with_body("bbb")
            .expect(1)
            .create_async()
            .await;
        let absent = server
            .mock("GET", "/golang/go1.15.src.tar.gz.sha256")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let storage = StorageClient::new(reqwest::Client::new(), &server.url(), "golang", "go1");
        let mut files = vec![
            file("go1.15.linux-amd64.tar.gz", ""),
            file("go1.15.darwin-amd64.tar.gz", ""),
            file("go1.15.src.tar.gz", ""),
        ];
        let releases = feed(&[("go1.15.linux-amd64.tar.gz", "aaa")]);

        ChecksumFetcher::new(&storage, 4)
            .fill(&mut files, &releases)
            .await
            .unwrap();

        from_feed.assert_async().await;
        missing.assert_async().await;
        absent.assert_async().await;
        let shas: Vec<&str> = files.iter().map(|f| f.sha256.as_str()).collect();
        assert_eq!(shas, vec!["aaa", "bbb", ""]);
    }

    #[tokio::test]
    async fn fetch_missing_fails_on_unexpected_status() {
        let mut server = Server::new_async().await;

        let ok = server
            .mock("GET", "/golang/go1.15.linux-amd64.tar.gz.sha256")
            .with_status(200)
            .with_body("aaa")
            .create_async()
            .await;
        let broken = server
            .mock("GET", "/golang/go1.15.src.tar.gz.sha256")
            .with_status(500)
            .create_async()
            .await;

        let storage = StorageClient::new(reqwest::Client::new(), &server.url(), "golang", "go1");
        let mut files = vec![
            file("go1.15.linux-amd64.tar.gz", ""),
            file("go1.15.src.tar.gz", ""),
        ];

        let result = ChecksumFetcher::new(&storage, 2)
            .fetch_missing(&mut files)
            .await;

        ok.assert_async().await;
        broken.assert_async().await;
        assert!(matches!(
            result,
            Err(FetchError::Checksum { ref filename, .. }) if filename == "go1.15.src.tar.gz"
        ));
        assert!(files.iter().all(|f| f.sha256.is_empty()));
    }

    #[tokio::test]
    async fn fetch_missing_stops_claiming_work_after_first_failure() {
        let mut source = MockChecksumSource::new();
        source
            .expect_fetch_checksum()
            .withf(|filename| filename == "go1.15.linux-amd64.tar.gz")
            .times(1)
            .returning(|_| Err(UpstreamError::InvalidResponse("boom".to_string())));
        // A single worker must not move on to the remaining files.
        source
            .expect_fetch_checksum()
            .withf(|filename| filename != "go1.15.linux-amd64.tar.gz")
            .times(0)
            .returning(|_| Ok("unused".to_string()));

        let mut files = vec![
            file("go1.15.linux-amd64.tar.gz", ""),
            file("go1.15.darwin-amd64.tar.gz", ""),
            file("go1.15.src.tar.gz", ""),
        ];

        let result = ChecksumFetcher::new(&source, 1)
            .fetch_missing(&mut files)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::Checksum { ref filename, .. }) if filename == "go1.15.linux-amd64.tar.gz"
        ));
    }

    #[tokio::test]
    async fn fetch_missing_skips_files_that_already_have_checksums() {
        let mut source = MockChecksumSource::new();
        source
            .expect_fetch_checksum()
            .withf(|filename| filename == "go1.15.src.tar.gz")
            .times(1)
            .returning(|_| Ok("ccc".to_string()));

        let mut files = vec![
            file("go1.15.linux-amd64.tar.gz", "aaa"),
            file("go1.15.src.tar.gz", ""),
        ];

        ChecksumFetcher::with_default_concurrency(&source)
            .fetch_missing(&mut files)
            .await
            .unwrap();

        assert_eq!(files[0].sha256, "aaa");
        assert_eq!(files[1].sha256, "ccc");
    }

    #[tokio::test]
    async fn fetch_missing_never_exceeds_worker_budget() {
        let source = SlowSource::default();
        let mut files = numbered_files(50);

        ChecksumFetcher::new(&source, 7)
            .fetch_missing(&mut files)
            .await
            .unwrap();

        assert_eq!(source.peak.load(Ordering::SeqCst), 7);
        assert_eq!(source.calls.load(Ordering::SeqCst), 50);
        assert!(files.iter().all(|f| f.sha256 == format!("sha-{}", f.filename)));
    }

    #[tokio::test]
    async fn fetch_missing_stops_dispatch_after_failure_with_several_workers() {
        let source = SlowSource {
            failing: Some("f0"),
            ..Default::default()
        };
        let mut files = numbered_files(20);

        let result = ChecksumFetcher::new(&source, 4)
            .fetch_missing(&mut files)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::Checksum { ref filename, .. }) if filename == "f0"
        ));
        // Only the requests claimed before the failure was recorded are sent.
        assert!(source.calls.load(Ordering::SeqCst) <= 4);
        assert!(files.iter().all(|f| f.sha256.is_empty()));
    }
}
