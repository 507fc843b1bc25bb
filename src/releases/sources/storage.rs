//! Release bucket client for the Cloud Storage JSON API

use serde::Deserialize;
use tracing::{debug, warn};

use crate::releases::error::UpstreamError;
use crate::releases::source::{ChecksumSource, ObjectListing};
use crate::releases::types::StorageObject;

/// Default base URL for the storage API
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Bucket holding Go release artifacts
pub const DEFAULT_BUCKET: &str = "golang";

/// Object name prefix shared by all Go 1.x release artifacts
pub const DEFAULT_PREFIX: &str = "go1";

/// One page of the object listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    next_page_token: String,
    #[serde(default)]
    items: Vec<StorageObject>,
}

/// Client for the bucket listing and per-object content
pub struct StorageClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    prefix: String,
}

impl StorageClient {
    pub fn new(client: reqwest::Client, base_url: &str, bucket: &str, prefix: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }
    }

    fn object_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, object_name)
    }

    async fn fetch_page(&self, page_token: &str) -> Result<ListPage, UpstreamError> {
        let endpoint = format!("{}/storage/v1/b/{}/o", self.base_url, self.bucket);
        let mut list_url = reqwest::Url::parse(&endpoint)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        list_url
            .query_pairs_mut()
            .append_pair("prefix", &self.prefix)
            .append_pair("pageToken", page_token);
        let url = list_url.to_string();

        let response = self.client.get(list_url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Storage listing returned status {}: {}", status, url);
            return Err(UpstreamError::UnexpectedStatus { status, url });
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse storage listing page: {}", e);
            UpstreamError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl ObjectListing for StorageClient {
    async fn list_objects(&self) -> Result<Vec<StorageObject>, UpstreamError> {
        let mut objects = Vec::new();
        let mut page_token = String::new();

        loop {
            let page = self.fetch_page(&page_token).await?;
            debug!(
                "Fetched {} objects from {} (page token {:?})",
                page.items.len(),
                self.bucket,
                page_token
            );
            objects.extend(page.items);

            if page.next_page_token.is_empty() {
                break;
            }
            page_token = page.next_page_token;
        }

        Ok(objects)
    }
}

#[async_trait::async_trait]
impl ChecksumSource for StorageClient {
    async fn fetch_checksum(&self, filename: &str) -> Result<String, UpstreamError> {
        let url = self.object_url(&format!("{}.sha256", filename));

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("No checksum published for {}", filename);
            return Ok(String::new());
        }
        if status != reqwest::StatusCode::OK {
            warn!("Checksum request returned status {}: {}", status, url);
            return Err(UpstreamError::UnexpectedStatus { status, url });
        }

        let body = response.text().await?;
        Ok(body.trim().to_string())
    }
}
