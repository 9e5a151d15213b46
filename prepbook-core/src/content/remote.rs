// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote content source
//!
//! A blob store addressed by slash-separated paths. The HTTP
//! implementation lives in `fetcher` behind the `remote-http` feature;
//! `MockRemote` serves scripted blobs for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Fetches blobs from the remote content source
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the blob at `path`.
    ///
    /// `progress` is called with `(bytes_received, total_bytes)` as the
    /// transfer advances. It is purely observational.
    async fn fetch(
        &self,
        path: &str,
        progress: &(dyn Fn(u64, Option<u64>) + Send + Sync),
    ) -> Result<Vec<u8>, FetchError>;
}

/// Progress callback that ignores all notifications
pub fn no_progress(_received: u64, _total: Option<u64>) {}

/// Size of the chunks `MockRemote` reports progress in
const MOCK_CHUNK_SIZE: usize = 1024;

/// Scripted remote source for tests.
///
/// Records every requested path. Unknown paths fail with HTTP 404; an
/// offline source fails every request.
#[derive(Debug, Default)]
pub struct MockRemote {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MockRemote {
    /// Create a source with no blobs
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `insert`
    pub fn with_blob(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Serve `data` at `path`
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.blobs.lock().insert(path.to_string(), data.into());
    }

    /// Stop serving `path`
    pub fn remove(&self, path: &str) {
        self.blobs.lock().remove(path);
    }

    /// Fail every request
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every response
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Paths requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of requests for `path`
    pub fn fetch_count(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|p| *p == path).count()
    }

    /// Forget recorded requests
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn fetch(
        &self,
        path: &str,
        progress: &(dyn Fn(u64, Option<u64>) + Send + Sync),
    ) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().push(path.to_string());

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Unavailable(path.to_string()));
        }

        let data = self
            .blobs
            .lock()
            .get(path)
            .cloned()
            .ok_or(FetchError::Http(404))?;

        let total = data.len() as u64;
        let mut received = 0u64;
        for chunk in data.chunks(MOCK_CHUNK_SIZE) {
            received += chunk.len() as u64;
            progress(received, Some(total));
        }
        Ok(data)
    }
}

/// Errors that can occur during content fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP error with status code
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Network/request error
    #[cfg(feature = "remote-http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Content too large
    #[error("Content too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        max: u64,
    },

    /// Remote source cannot be reached
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}
