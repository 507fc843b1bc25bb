//! HTTP implementations of the upstream sources

pub mod golang_dl;
pub mod storage;

pub use golang_dl::GolangDlFeed;
pub use storage::StorageClient;

/// User agent sent with every upstream request
pub const USER_AGENT: &str = "goreleases";

/// Builds the HTTP client shared by the upstream sources
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
