//! Configuration for content synchronization

use std::path::PathBuf;
use std::time::Duration;

use super::bundled::BUNDLED_LANGUAGE;

/// Configuration for the content sync system
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Local storage path; content lives in its `content/` subdirectory
    pub storage_path: PathBuf,

    /// Remote content URL (e.g., "https://content.prepbook.app")
    pub content_url: String,

    /// Remote path of the master manifest, relative to `content_url`
    pub manifest_path: String,

    /// Language served when the requested one is unavailable
    pub fallback_language: String,

    /// Enable/disable remote updates
    pub remote_updates_enabled: bool,

    /// Probe historical remote paths after the current one
    pub legacy_paths: bool,

    /// Minimum interval between update checks
    pub check_interval: Duration,

    /// HTTP timeout for fetches
    pub timeout: Duration,

    /// Maximum content file size (bytes)
    pub max_content_size: u64,

    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("."),
            content_url: "https://content.prepbook.app".to_string(),
            manifest_path: "manifest.json".to_string(),
            fallback_language: BUNDLED_LANGUAGE.to_string(),
            remote_updates_enabled: true,
            legacy_paths: true,
            check_interval: Duration::from_secs(6 * 3600),
            timeout: Duration::from_secs(30),
            max_content_size: 20 * 1024 * 1024, // 20 MB, question banks with media metadata
            proxy_url: None,
        }
    }
}

impl ContentConfig {
    /// Directory holding module files, `versions.json` and the cached manifest
    pub fn content_dir(&self) -> PathBuf {
        self.storage_path.join("content")
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }

    /// Disable remote updates (use cached and bundled content only)
    pub fn without_remote_updates(mut self) -> Self {
        self.remote_updates_enabled = false;
        self
    }

    /// Only try the current remote path for each module
    pub fn without_legacy_paths(mut self) -> Self {
        self.legacy_paths = false;
        self
    }
}
