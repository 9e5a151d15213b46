// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote content synchronization module
//!
//! Keeps these content modules fresh per language:
//! - E-book chapters
//! - Exam question banks (per chapter and mock exam)
//! - Privacy policy
//! - Help articles (general help, getting started)
//!
//! Each `(module, language)` pair is compared against the remote manifest
//! and re-downloaded when the manifest version is newer or the local file
//! is missing. Failures degrade to the stale local copy, then to English,
//! then to content bundled in the binary.

mod bundled;
mod config;
mod exam;
#[cfg(feature = "remote-http")]
mod fetcher;
mod integrity;
mod manager;
mod manifest;
mod registry;
mod remote;
mod store;
mod sync;
mod types;

pub use bundled::BUNDLED_LANGUAGE;
pub use config::ContentConfig;
pub use exam::{AnswerError, Chapter, ExamData, Identifier, Question};
#[cfg(feature = "remote-http")]
pub use fetcher::HttpSource;
pub use integrity::{compute_checksum, verify_checksum, IntegrityError};
pub use manager::{ApplyResult, ContentManager, PendingUpdate, UpdateStatus};
pub use manifest::{ManifestFetcher, MANIFEST_CACHE_FILE};
pub use registry::{VersionRegistry, REGISTRY_FILE};
pub use remote::{no_progress, FetchError, MockRemote, RemoteSource};
pub use store::{atomic_write, FsStore, LocalStore, MemoryStore, StoreError};
pub use sync::{
    needs_update, ContentError, ContentSynchronizer, DeleteReport, ProgressCallback,
    TransferProgress,
};
pub use types::{
    expand_template, is_valid_language, ContentModule, ContentSource, LanguageEntry, Manifest,
    ModuleEntry, ModuleSpec, Synced, DEFAULT_MODULE_VERSION,
};
