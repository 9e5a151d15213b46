//! HTTP remote content source
//!
//! Downloads manifests and module files over HTTP with:
//! - Size limits
//! - Proxy support
//! - Timeout configuration
//! - Progress reporting per received chunk

use async_trait::async_trait;
use reqwest::Client;

use super::config::ContentConfig;
use super::remote::{FetchError, RemoteSource};

/// Fetches content from the remote content server
pub struct HttpSource {
    client: Client,
    base_url: String,
    max_content_size: u64,
}

impl HttpSource {
    /// Create a new HTTP source from config
    pub fn new(config: &ContentConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("Prepbook/{}", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.content_url.trim_end_matches('/').to_string(),
            max_content_size: config.max_content_size,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check_size(&self, size: u64) -> Result<(), FetchError> {
        if size > self.max_content_size {
            return Err(FetchError::TooLarge {
                size,
                max: self.max_content_size,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch(
        &self,
        path: &str,
        progress: &(dyn Fn(u64, Option<u64>) + Send + Sync),
    ) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(path);
        let mut response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        // Check content length before downloading
        let total = response.content_length();
        if let Some(len) = total {
            self.check_size(len)?;
        }

        let capacity = total.unwrap_or(0).min(self.max_content_size) as usize;
        let mut data = Vec::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
            // Content-length may be missing or wrong
            self.check_size(data.len() as u64)?;
            progress(data.len() as u64, total);
        }

        Ok(data)
    }
}
