//! Content Manager - application entry point for content
//!
//! The ContentManager is created once at application start and handed to
//! consumers. It wraps the synchronizer with:
//! - Typed accessors per content module
//! - Language management (downloaded languages, download, delete)
//! - Update checks throttled by `check_interval`

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::config::ContentConfig;
use super::exam::ExamData;
use super::registry::VersionRegistry;
use super::remote::RemoteSource;
use super::store::{atomic_write, LocalStore};
use super::sync::{ContentError, ContentSynchronizer, DeleteReport, ProgressCallback};
use super::types::{ContentModule, ContentSource, LanguageEntry, ModuleSpec, Synced};

const LAST_CHECK_FILE: &str = "last_check";

/// A module whose manifest version is ahead of the local copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Module with a newer version
    pub module: ContentModule,
    /// Language of the local copy
    pub language: String,
    /// Version recorded locally
    pub current: u32,
    /// Version in the manifest
    pub available: u32,
}

/// Update check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// All downloaded content is up to date
    UpToDate,
    /// Newer versions are available
    UpdatesAvailable(Vec<PendingUpdate>),
    /// Update check failed with the given error message
    CheckFailed(String),
    /// Remote updates are disabled by configuration
    Disabled,
}

/// Result of downloading a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Every module was already current
    NoUpdates,
    /// Downloads were attempted
    Applied {
        /// Modules downloaded in the requested language
        applied: Vec<ContentModule>,
        /// Modules not available in the requested language, with reason
        failed: Vec<(ContentModule, String)>,
    },
    /// Remote updates are disabled
    Disabled,
}

/// Manages content loading with remote → stale → fallback language → bundled
pub struct ContentManager {
    sync: ContentSynchronizer,
}

impl ContentManager {
    /// Create a new ContentManager over the given store and remote source
    pub fn new(
        config: ContentConfig,
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteSource>,
    ) -> Self {
        Self {
            sync: ContentSynchronizer::new(config, store, remote),
        }
    }

    /// Create a ContentManager backed by the filesystem and HTTP
    #[cfg(feature = "remote-http")]
    pub fn with_http(config: ContentConfig) -> Result<Self, ContentError> {
        let remote = super::fetcher::HttpSource::new(&config)?;
        Ok(Self::new(
            config,
            Arc::new(super::store::FsStore::new()),
            Arc::new(remote),
        ))
    }

    /// Report download progress to `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.sync = self.sync.with_progress(callback);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ContentConfig {
        self.sync.config()
    }

    /// Get the synchronizer (for advanced operations)
    pub fn synchronizer(&self) -> &ContentSynchronizer {
        &self.sync
    }

    /// Resolve a module for a language
    pub async fn content(&self, module: ContentModule, lang: &str) -> Result<Synced, ContentError> {
        self.sync.sync_module(&module.spec(), lang).await
    }

    async fn typed<T: DeserializeOwned>(
        &self,
        module: ContentModule,
        lang: &str,
    ) -> Result<T, ContentError> {
        let synced = self.content(module, lang).await?;
        Ok(serde_json::from_value(synced.content)?)
    }

    /// Exam question banks by chapter
    pub async fn exam_questions(&self, lang: &str) -> Result<ExamData, ContentError> {
        self.typed(ContentModule::ChapterQuestions, lang).await
    }

    /// Mock exam question bank
    pub async fn mock_exam(&self, lang: &str) -> Result<ExamData, ContentError> {
        self.typed(ContentModule::MockExam, lang).await
    }

    /// E-book chapter index
    pub async fn book_chapters(&self, lang: &str) -> Result<Value, ContentError> {
        self.typed(ContentModule::BookChapters, lang).await
    }

    /// Privacy policy document
    pub async fn privacy_policy(&self, lang: &str) -> Result<Value, ContentError> {
        self.typed(ContentModule::PrivacyPolicy, lang).await
    }

    /// Exam help articles
    pub async fn exam_help(&self, lang: &str) -> Result<Value, ContentError> {
        self.typed(ContentModule::ExamHelp, lang).await
    }

    /// Getting-started guide
    pub async fn getting_started(&self, lang: &str) -> Result<Value, ContentError> {
        self.typed(ContentModule::GettingStarted, lang).await
    }

    /// Languages offered by the manifest; the fallback language when unknown
    pub async fn available_languages(&self) -> Vec<LanguageEntry> {
        let fallback = LanguageEntry {
            code: self.config().fallback_language.clone(),
            name: String::new(),
        };
        match self.sync.manifests().get_master_manifest().await {
            Some(manifest) if !manifest.languages.is_empty() => manifest.languages,
            _ => vec![fallback],
        }
    }

    /// Languages with downloaded content, always including the fallback language
    pub async fn downloaded_languages(&self) -> BTreeSet<String> {
        let registry = self.sync.registry().await;
        let mut languages = registry_languages(&registry);
        languages.insert(self.config().fallback_language.clone());
        languages
    }

    /// Whether any module has been downloaded for `lang`
    pub async fn is_downloaded(&self, lang: &str) -> bool {
        self.downloaded_languages().await.contains(lang)
    }

    /// Download every module for `lang`
    pub async fn download_language(&self, lang: &str) -> ApplyResult {
        if !self.config().remote_updates_enabled {
            return ApplyResult::Disabled;
        }

        let manifest = self.sync.manifests().get_master_manifest().await;
        let mut applied = Vec::new();
        let mut failed = Vec::new();

        for module in ContentModule::all() {
            let result = self
                .sync
                .sync_module_with(&module.spec(), lang, manifest.as_ref())
                .await;
            match result {
                Ok(synced) if synced.language != lang => failed.push((
                    *module,
                    format!("not available, fell back to {}", synced.language),
                )),
                Ok(synced) => match synced.source {
                    ContentSource::Downloaded => applied.push(*module),
                    ContentSource::Stale => {
                        failed.push((*module, "download failed, kept stale copy".to_string()))
                    }
                    ContentSource::Cached | ContentSource::Bundled => {}
                },
                Err(e) => failed.push((*module, e.to_string())),
            }
        }

        if applied.is_empty() && failed.is_empty() {
            ApplyResult::NoUpdates
        } else {
            ApplyResult::Applied { applied, failed }
        }
    }

    /// Remove a downloaded language. The fallback language is kept.
    pub async fn delete_language(&self, lang: &str) -> Result<DeleteReport, ContentError> {
        let specs: Vec<ModuleSpec> = ContentModule::all().iter().map(|m| m.spec()).collect();
        self.sync.delete_language(lang, &specs).await
    }

    /// Check for newer versions of downloaded content without downloading.
    ///
    /// Only languages with registry entries are compared; bundled-only
    /// content has nothing to update.
    pub async fn check_for_updates(&self) -> UpdateStatus {
        if !self.config().remote_updates_enabled {
            return UpdateStatus::Disabled;
        }

        let manifest = match self.sync.manifests().fetch_remote().await {
            Ok(manifest) => manifest,
            Err(e) => return UpdateStatus::CheckFailed(e.to_string()),
        };
        if let Err(e) = self.record_check_time().await {
            warn!("Failed to record update check time: {}", e);
        }

        let registry = self.sync.registry().await;
        let languages = registry_languages(&registry);

        let mut pending = Vec::new();
        for lang in &languages {
            for module in ContentModule::all() {
                let Some(entry) = manifest.entry(module.key()) else {
                    continue;
                };
                let current = registry.get(&module.spec().version_key(lang));
                if entry.version > current {
                    pending.push(PendingUpdate {
                        module: *module,
                        language: lang.clone(),
                        current,
                        available: entry.version,
                    });
                }
            }
        }

        debug!("Update check found {} pending modules", pending.len());
        if pending.is_empty() {
            UpdateStatus::UpToDate
        } else {
            UpdateStatus::UpdatesAvailable(pending)
        }
    }

    /// Check if an update check should be performed now
    pub async fn should_check_now(&self) -> bool {
        if !self.config().remote_updates_enabled {
            return false;
        }

        let Some(last_check) = self.last_check_time().await else {
            // Never checked before
            return true;
        };

        let elapsed = SystemTime::now()
            .duration_since(last_check)
            .unwrap_or_default();
        elapsed >= self.config().check_interval
    }

    /// Get the last time updates were checked
    pub async fn last_check_time(&self) -> Option<SystemTime> {
        let data = self.sync.store().read(&self.last_check_path()).await.ok()?;
        let secs: u64 = std::str::from_utf8(&data).ok()?.trim().parse().ok()?;
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Record that an update check was performed
    pub async fn record_check_time(&self) -> Result<(), ContentError> {
        self.set_last_check_time(SystemTime::now()).await
    }

    /// Set the last time updates were checked
    pub async fn set_last_check_time(&self, time: SystemTime) -> Result<(), ContentError> {
        let secs = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let store = self.sync.store();
        store.create_dir_all(self.sync.root()).await?;
        atomic_write(store.as_ref(), &self.last_check_path(), secs.to_string().as_bytes()).await?;
        Ok(())
    }

    fn last_check_path(&self) -> PathBuf {
        self.sync.root().join(LAST_CHECK_FILE)
    }
}

/// Languages that have at least one module key in the registry
fn registry_languages(registry: &VersionRegistry) -> BTreeSet<String> {
    registry
        .iter()
        .filter_map(|(key, _)| {
            ContentModule::all().iter().find_map(|module| {
                key.strip_prefix(module.key())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .filter(|lang| !lang.is_empty())
            })
        })
        .map(str::to_string)
        .collect()
}
