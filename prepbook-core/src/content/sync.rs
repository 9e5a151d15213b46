// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content Synchronizer - version-compare-then-download-or-fallback
//!
//! Resolves one module for one language:
//! 1. Read target version and remote path from the manifest (or defaults)
//! 2. Compare with the version registry and check the local file
//! 3. Download when the manifest is newer or the file is missing
//! 4. On failure serve the stale local copy, then the fallback language,
//!    then the bundled default
//!
//! Requests for the same `(module, language)` key are serialized: a second
//! request waits for the first and then finds the content current.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::ContentConfig;
use super::integrity::{verify_checksum, IntegrityError};
use super::manifest::{ManifestFetcher, MANIFEST_CACHE_FILE};
use super::registry::{VersionRegistry, REGISTRY_FILE};
use super::remote::{FetchError, RemoteSource};
use super::store::{atomic_write, LocalStore, StoreError};
use super::types::{
    expand_template, is_valid_language, ContentSource, Manifest, ModuleSpec, Synced,
    DEFAULT_MODULE_VERSION,
};

/// Progress of one module download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Registry key being downloaded, e.g. "mock_fr"
    pub version_key: String,
    /// Remote path being fetched
    pub path: String,
    /// Bytes received so far
    pub received: u64,
    /// Total bytes, when known
    pub total: Option<u64>,
}

/// Observer for download progress
pub type ProgressCallback = Arc<dyn Fn(&TransferProgress) + Send + Sync>;

/// Update is required iff the manifest is newer or there is no local copy
pub fn needs_update(target_version: u32, current_version: u32, has_local: bool) -> bool {
    target_version > current_version || !has_local
}

/// What `delete_language` removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Local files removed
    pub removed_files: Vec<String>,
    /// Files that could not be removed, with the error
    pub failed_files: Vec<(String, String)>,
    /// Registry keys removed
    pub removed_keys: Vec<String>,
}

/// Where the download for one request should come from
struct Target {
    version: u32,
    candidates: Vec<String>,
    checksum: Option<String>,
}

/// Keeps module content in sync with the remote manifest
pub struct ContentSynchronizer {
    config: ContentConfig,
    root: PathBuf,
    store: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteSource>,
    manifests: ManifestFetcher,
    registry_lock: tokio::sync::Mutex<()>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    progress: Option<ProgressCallback>,
}

impl ContentSynchronizer {
    /// Create a synchronizer over the given store and remote source
    pub fn new(
        config: ContentConfig,
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteSource>,
    ) -> Self {
        let root = config.content_dir();
        let manifests = ManifestFetcher::new(
            remote.clone(),
            store.clone(),
            config.manifest_path.clone(),
            root.join(MANIFEST_CACHE_FILE),
            config.remote_updates_enabled,
        );

        Self {
            config,
            root,
            store,
            remote,
            manifests,
            registry_lock: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(HashMap::new()),
            progress: None,
        }
    }

    /// Report download progress to `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Directory holding module files and the registry
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the local store
    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// Get the manifest fetcher
    pub fn manifests(&self) -> &ManifestFetcher {
        &self.manifests
    }

    /// Local path of a module file
    pub fn local_path(&self, spec: &ModuleSpec, lang: &str) -> PathBuf {
        self.root.join(spec.local_filename(lang))
    }

    /// Path of `versions.json`
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Load the current version registry
    pub async fn registry(&self) -> VersionRegistry {
        VersionRegistry::load(self.store.as_ref(), &self.registry_path()).await
    }

    /// Resolve `spec` for `lang`, fetching the manifest first
    pub async fn sync_module(&self, spec: &ModuleSpec, lang: &str) -> Result<Synced, ContentError> {
        let manifest = self.manifests.get_master_manifest().await;
        self.sync_module_with(spec, lang, manifest.as_ref()).await
    }

    /// Resolve `spec` for `lang` against an already fetched manifest.
    ///
    /// Falls back exactly once to the fallback language, then to the
    /// bundled default. Only when no bundled default exists does an error
    /// reach the caller.
    pub async fn sync_module_with(
        &self,
        spec: &ModuleSpec,
        lang: &str,
        manifest: Option<&Manifest>,
    ) -> Result<Synced, ContentError> {
        check_language(lang)?;

        match self.resolve(spec, lang, manifest).await {
            Ok(synced) => return Ok(synced),
            Err(e) => warn!("Failed to resolve {}: {}", spec.version_key(lang), e),
        }

        let fallback = self.config.fallback_language.as_str();
        if lang != fallback {
            info!("Falling back to {} for {}", fallback, spec.key);
            match self.resolve(spec, fallback, manifest).await {
                Ok(synced) => return Ok(synced),
                Err(e) => warn!("Failed to resolve {}: {}", spec.version_key(fallback), e),
            }
        }

        match (spec.bundled)(fallback) {
            Some(content) => {
                info!("Serving bundled {} for {}", fallback, spec.key);
                Ok(Synced {
                    module: spec.key.to_string(),
                    language: fallback.to_string(),
                    content,
                    source: ContentSource::Bundled,
                    version: None,
                })
            }
            None => Err(ContentError::Exhausted {
                module: spec.key.to_string(),
                language: lang.to_string(),
            }),
        }
    }

    /// Resolve one key without language fallback, holding its in-flight guard
    async fn resolve(
        &self,
        spec: &ModuleSpec,
        lang: &str,
        manifest: Option<&Manifest>,
    ) -> Result<Synced, ContentError> {
        let version_key = spec.version_key(lang);
        let guard = self.key_guard(&version_key);
        let result = {
            let _held = guard.lock().await;
            self.resolve_locked(spec, lang, &version_key, manifest).await
        };
        drop(guard);
        self.release_key_guard(&version_key);
        result
    }

    async fn resolve_locked(
        &self,
        spec: &ModuleSpec,
        lang: &str,
        version_key: &str,
        manifest: Option<&Manifest>,
    ) -> Result<Synced, ContentError> {
        let target = self.target(spec, lang, manifest);
        let local_path = self.local_path(spec, lang);
        let current = self.registry().await.get(version_key);
        let mut has_local = self.store.exists(&local_path).await;

        let synced = |content: Value, source: ContentSource, version: Option<u32>| Synced {
            module: spec.key.to_string(),
            language: lang.to_string(),
            content,
            source,
            version,
        };

        if !needs_update(target.version, current, has_local) {
            match self.read_local(spec, &local_path).await {
                Ok(content) => {
                    debug!("{} is current at version {}", version_key, current);
                    return Ok(synced(content, ContentSource::Cached, Some(current)));
                }
                Err(e) => {
                    // Unreadable counts as missing
                    warn!("Local {} is unusable, downloading again: {}", version_key, e);
                    has_local = false;
                }
            }
        }

        if self.config.remote_updates_enabled {
            match self.download(spec, version_key, &target).await {
                Ok((data, content)) => {
                    match self.apply(&local_path, version_key, target.version, &data).await {
                        Ok(()) => {
                            info!("Updated {} to version {}", version_key, target.version);
                            return Ok(synced(
                                content,
                                ContentSource::Downloaded,
                                Some(target.version),
                            ));
                        }
                        Err(e) => warn!("Failed to apply {}: {}", version_key, e),
                    }
                }
                Err(e) => warn!("Download of {} failed: {}", version_key, e),
            }
        } else {
            debug!("Remote updates disabled, not downloading {}", version_key);
        }

        if has_local {
            info!("Serving stale {} at version {}", version_key, current);
            let content = self.read_local(spec, &local_path).await?;
            return Ok(synced(content, ContentSource::Stale, Some(current)));
        }

        Err(ContentError::Unavailable(version_key.to_string()))
    }

    fn target(&self, spec: &ModuleSpec, lang: &str, manifest: Option<&Manifest>) -> Target {
        let (version, primary, checksum) = match manifest.and_then(|m| m.entry(spec.key)) {
            Some(entry) => (entry.version, entry.resolve_path(lang), entry.checksum.clone()),
            None => {
                warn!("Module {} not in manifest, using defaults", spec.key);
                (
                    DEFAULT_MODULE_VERSION,
                    expand_template(spec.remote_template, lang),
                    None,
                )
            }
        };

        let mut candidates = vec![primary];
        if self.config.legacy_paths {
            for template in spec.legacy_templates {
                let path = expand_template(template, lang);
                if !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }

        Target {
            version,
            candidates,
            checksum,
        }
    }

    /// Probe candidates in order; the first one that fetches and validates wins
    async fn download(
        &self,
        spec: &ModuleSpec,
        version_key: &str,
        target: &Target,
    ) -> Result<(Vec<u8>, Value), ContentError> {
        let mut last_error = ContentError::Unavailable(version_key.to_string());

        for path in &target.candidates {
            let report = |received: u64, total: Option<u64>| {
                if let Some(callback) = &self.progress {
                    callback(&TransferProgress {
                        version_key: version_key.to_string(),
                        path: path.clone(),
                        received,
                        total,
                    });
                }
            };

            let result = match self.remote.fetch(path, &report).await {
                Ok(data) => validate(spec, &data, target.checksum.as_deref())
                    .map(|value| (data, value)),
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(downloaded) => {
                    debug!("Fetched {} from {}", version_key, path);
                    return Ok(downloaded);
                }
                Err(e) => {
                    debug!("Candidate {} for {} failed: {}", path, version_key, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Put downloaded content in place, then record its version
    async fn apply(
        &self,
        local_path: &Path,
        version_key: &str,
        version: u32,
        data: &[u8],
    ) -> Result<(), ContentError> {
        self.store.create_dir_all(&self.root).await?;
        atomic_write(self.store.as_ref(), local_path, data).await?;

        let _registry = self.registry_lock.lock().await;
        let mut registry = self.registry().await;
        registry.set(version_key, version);
        if let Err(e) = registry.save(self.store.as_ref(), &self.registry_path()).await {
            // Content is in place; an unrecorded version only causes a re-download
            warn!("Failed to record {} version {}: {}", version_key, version, e);
        }
        Ok(())
    }

    async fn read_local(&self, spec: &ModuleSpec, path: &Path) -> Result<Value, ContentError> {
        let data = self.store.read(path).await?;
        validate(spec, &data, None)
    }

    /// Remove a language's downloaded files and registry entries.
    ///
    /// The fallback language is never deleted. Each file is removed
    /// independently; the registry is rewritten once at the end.
    pub async fn delete_language(
        &self,
        lang: &str,
        specs: &[ModuleSpec],
    ) -> Result<DeleteReport, ContentError> {
        check_language(lang)?;

        let mut report = DeleteReport::default();
        if lang == self.config.fallback_language {
            info!("Refusing to delete fallback language {}", lang);
            return Ok(report);
        }

        for spec in specs {
            let path = self.local_path(spec, lang);
            if !self.store.exists(&path).await {
                continue;
            }
            let filename = spec.local_filename(lang);
            match self.store.remove(&path).await {
                Ok(()) => report.removed_files.push(filename),
                Err(e) => {
                    warn!("Failed to delete {}: {}", filename, e);
                    report.failed_files.push((filename, e.to_string()));
                }
            }
        }

        let _registry = self.registry_lock.lock().await;
        let mut registry = self.registry().await;
        for spec in specs {
            let key = spec.version_key(lang);
            if registry.remove(&key).is_some() {
                report.removed_keys.push(key);
            }
        }
        if !report.removed_keys.is_empty() {
            if let Err(e) = registry.save(self.store.as_ref(), &self.registry_path()).await {
                warn!("Failed to save registry after deleting {}: {}", lang, e);
            }
        }

        info!(
            "Deleted language {}: {} files, {} registry keys",
            lang,
            report.removed_files.len(),
            report.removed_keys.len()
        );
        Ok(report)
    }

    fn key_guard(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    fn release_key_guard(&self, key: &str) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(key)
            .is_some_and(|guard| Arc::strong_count(guard) == 1)
        {
            in_flight.remove(key);
        }
    }
}

fn validate(
    spec: &ModuleSpec,
    data: &[u8],
    checksum: Option<&str>,
) -> Result<Value, ContentError> {
    if let Some(expected) = checksum {
        verify_checksum(data, expected)?;
    }
    let value = serde_json::from_slice(data)?;
    (spec.validate)(&value)?;
    Ok(value)
}

fn check_language(lang: &str) -> Result<(), ContentError> {
    if is_valid_language(lang) {
        Ok(())
    } else {
        Err(ContentError::InvalidLanguage(lang.to_string()))
    }
}

/// Errors that can occur while synchronizing content
#[derive(Debug, Error)]
pub enum ContentError {
    /// Local store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Fetch error (network/remote)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Integrity verification failed
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Language code unusable in file names
    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),

    /// Neither remote nor local copy available for a key
    #[error("Content unavailable: {0}")]
    Unavailable(String),

    /// Every fallback failed
    #[error("No content for {module} ({language}) after all fallbacks")]
    Exhausted {
        /// Module key
        module: String,
        /// Requested language
        language: String,
    },
}
