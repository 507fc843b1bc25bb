//! golang.org/dl release feed

use tracing::{debug, warn};

use crate::releases::error::UpstreamError;
use crate::releases::source::ReleaseFeed;
use crate::releases::types::FeedRelease;

/// Default URL of the release feed, including unstable and archived releases
pub const DEFAULT_FEED_URL: &str = "https://golang.org/dl/?mode=json&include=all";

/// Release feed published at golang.org/dl
pub struct GolangDlFeed {
    client: reqwest::Client,
    url: String,
}

impl GolangDlFeed {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ReleaseFeed for GolangDlFeed {
    async fn fetch_releases(&self) -> Result<Vec<FeedRelease>, UpstreamError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Release feed returned status {}: {}", status, self.url);
            return Err(UpstreamError::UnexpectedStatus {
                status,
                url: self.url.clone(),
            });
        }

        let releases: Vec<FeedRelease> = response.json().await.map_err(|e| {
            warn!("Failed to parse release feed: {}", e);
            UpstreamError::InvalidResponse(e.to_string())
        })?;

        debug!("Release feed listed {} releases", releases.len());
        Ok(releases)
    }
}
