use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::releases::fetch::FetchOptions;
use crate::releases::sources::golang_dl::DEFAULT_FEED_URL;
use crate::releases::sources::storage::{DEFAULT_BASE_URL, DEFAULT_BUCKET, DEFAULT_PREFIX};

// =============================================================================
// Fetch constants
// =============================================================================

/// Number of concurrent checksum requests
pub const CHECKSUM_CONCURRENCY: usize = 160;

/// Versions left out of the catalog by default. go1.7.2 was never released
/// although its files exist in the bucket.
pub const DEFAULT_SKIP_VERSIONS: &[&str] = &["go1.7.2"];

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetch configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub storage: StorageConfig,
    /// URL of the release feed used for checksums
    pub feed_url: String,
    pub skip_versions: Vec<String>,
    pub checksum_concurrency: usize,
    /// Overall fetch timeout in seconds, 0 disables it
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            skip_versions: DEFAULT_SKIP_VERSIONS.iter().map(|v| v.to_string()).collect(),
            checksum_concurrency: CHECKSUM_CONCURRENCY,
            timeout_secs: 0,
        }
    }
}

/// Release bucket configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    pub base_url: String,
    pub bucket: String,
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl FetchConfig {
    /// Load config from a JSON file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from the default location, or defaults when no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            client: None,
            skip_versions: self.skip_versions.iter().cloned().collect::<HashSet<_>>(),
            storage_base_url: self.storage.base_url.clone(),
            bucket: self.storage.bucket.clone(),
            prefix: self.storage.prefix.clone(),
            feed_url: self.feed_url.clone(),
            checksum_concurrency: self.checksum_concurrency,
        }
    }
}

/// Returns the path to the config directory for goreleases.
/// Uses $XDG_CONFIG_HOME/goreleases if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/goreleases,
/// or ./goreleases if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the config file.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("goreleases")
}
