// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Master manifest fetching with local cache fallback

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::remote::{no_progress, RemoteSource};
use super::store::{atomic_write, LocalStore};
use super::sync::ContentError;
use super::types::Manifest;

/// Cached manifest filename inside the content directory
pub const MANIFEST_CACHE_FILE: &str = "manifest.json";

/// Fetches the master manifest, falling back to the last cached copy
pub struct ManifestFetcher {
    remote: Arc<dyn RemoteSource>,
    store: Arc<dyn LocalStore>,
    remote_path: String,
    cache_path: PathBuf,
    remote_enabled: bool,
}

impl ManifestFetcher {
    /// Create a fetcher for `remote_path`, caching to `cache_path`
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        store: Arc<dyn LocalStore>,
        remote_path: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        remote_enabled: bool,
    ) -> Self {
        Self {
            remote,
            store,
            remote_path: remote_path.into(),
            cache_path: cache_path.into(),
            remote_enabled,
        }
    }

    /// Get the master manifest.
    ///
    /// Always tries the remote first (single attempt, no retry). On any
    /// failure the cached copy is used; `None` when neither is usable.
    pub async fn get_master_manifest(&self) -> Option<Manifest> {
        if self.remote_enabled {
            match self.fetch_remote().await {
                Ok(manifest) => return Some(manifest),
                Err(e) => warn!("Manifest fetch failed, trying cache: {}", e),
            }
        }

        let cached = self.cached().await;
        if cached.is_none() {
            info!("No manifest available, using module defaults");
        }
        cached
    }

    /// Fetch and parse the remote manifest, caching the raw bytes on success
    pub async fn fetch_remote(&self) -> Result<Manifest, ContentError> {
        let data = self.remote.fetch(&self.remote_path, &no_progress).await?;
        let manifest: Manifest = serde_json::from_slice(&data)?;

        if let Some(dir) = self.cache_path.parent() {
            if let Err(e) = self.store.create_dir_all(dir).await {
                warn!("Failed to create manifest cache directory: {}", e);
            }
        }
        if let Err(e) = atomic_write(self.store.as_ref(), &self.cache_path, &data).await {
            warn!("Failed to cache manifest: {}", e);
        }

        debug!("Fetched manifest with {} modules", manifest.modules.len());
        Ok(manifest)
    }

    /// Read the cached manifest
    pub async fn cached(&self) -> Option<Manifest> {
        let data = self.store.read(&self.cache_path).await.ok()?;
        match serde_json::from_slice(&data) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Cached manifest is corrupt: {}", e);
                None
            }
        }
    }
}
