//! Fake upstream servers for pipeline tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};

use goreleases::releases::FetchOptions;

/// Bucket used by the fake storage server
pub const BUCKET: &str = "golang";

/// Release bucket and release feed served by one mockito server
pub struct FakeUpstream {
    pub server: ServerGuard,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// Fetch options pointing every upstream at this server
    pub fn options(&self, concurrency: usize) -> FetchOptions {
        FetchOptions {
            client: Some(reqwest::Client::new()),
            storage_base_url: self.server.url(),
            bucket: BUCKET.to_string(),
            feed_url: format!("{}/dl/?mode=json&include=all", self.server.url()),
            checksum_concurrency: concurrency,
            ..FetchOptions::default()
        }
    }

    /// Serve one listing page for `page_token`
    pub async fn listing_page(
        &mut self,
        page_token: &str,
        next_page_token: Option<&str>,
        names: &[&str],
    ) -> Mock {
        let items: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "name": name,
                    "etag": format!("etag{}", i),
                    "size": format!("{}", 1000 + i),
                    "timeCreated": "2020-08-11T19:01:57.471Z"
                })
            })
            .collect();
        let mut body = json!({ "items": items });
        if let Some(token) = next_page_token {
            body["nextPageToken"] = json!(token);
        }

        self.server
            .mock("GET", format!("/storage/v1/b/{}/o", BUCKET).as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prefix".into(), "go1".into()),
                Matcher::UrlEncoded("pageToken".into(), page_token.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    /// Serve the release feed with the given (filename, sha256) pairs
    pub async fn feed(&mut self, checksums: &[(&str, &str)]) -> Mock {
        let files: Vec<Value> = checksums
            .iter()
            .map(|(filename, sha256)| {
                json!({
                    "filename": filename,
                    "os": "",
                    "arch": "",
                    "version": "",
                    "sha256": sha256,
                    "size": 0,
                    "kind": "archive"
                })
            })
            .collect();
        let body = json!([{ "version": "feed", "stable": true, "files": files }]);

        self.server
            .mock("GET", "/dl/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    /// Serve `{filename}.sha256`, expecting exactly `hits` requests
    pub async fn checksum(&mut self, filename: &str, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("GET", format!("/{}/{}.sha256", BUCKET, filename).as_str())
            .with_status(status)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}
