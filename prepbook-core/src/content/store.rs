// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local store for downloaded content
//!
//! `LocalStore` abstracts whole-file storage so the synchronizer can run
//! against the real filesystem (`FsStore`) or an in-memory fake
//! (`MemoryStore`). Content files are replaced with `atomic_write`, so a
//! crash leaves either the old file or the new one, never a partial file.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Whole-file local storage
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Whether a file exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Read the whole file
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Create or replace the file with `data`
    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError>;

    /// Move `from` over `to`, replacing it
    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError>;

    /// Delete the file
    async fn remove(&self, path: &Path) -> Result<(), StoreError>;

    /// Create a directory and its parents
    async fn create_dir_all(&self, path: &Path) -> Result<(), StoreError>;
}

/// Atomic file write (write to temp, then rename)
pub async fn atomic_write(
    store: &dyn LocalStore,
    path: &Path,
    data: &[u8],
) -> Result<(), StoreError> {
    let temp_path = temp_path_for(path);
    store.write(&temp_path, data).await?;

    if let Err(e) = store.rename(&temp_path, path).await {
        let _ = store.remove(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Filesystem-backed store
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
    /// Create a filesystem store
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocalStore for FsStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(path).await.map_err(|e| StoreError::io(path, e))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
        tokio::fs::rename(from, to)
            .await
            .map_err(|e| StoreError::io(from, e))
    }

    async fn remove(&self, path: &Path) -> Result<(), StoreError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
///
/// Supports failure injection: `set_failing(true)` makes every operation
/// fail as if the device storage were unavailable, and `fail_path` makes
/// writes and removals of a single path fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    failing_paths: Mutex<HashSet<PathBuf>>,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a file directly, bypassing failure injection
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), data.into());
    }

    /// Get a file directly, bypassing failure injection
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// Whether a file is present
    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Make every operation fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make writes and removals of `path` fail
    pub fn fail_path(&self, path: impl Into<PathBuf>) {
        self.failing_paths.lock().insert(path.into());
    }

    fn check(&self, path: &Path) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) || self.failing_paths.lock().contains(path) {
            return Err(StoreError::Unavailable(path.display().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn exists(&self, path: &Path) -> bool {
        !self.failing.load(Ordering::SeqCst) && self.contains(path)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(path.display().to_string()));
        }
        self.get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        self.check(path)?;
        self.insert(path, data);
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
        self.check(to)?;
        let mut files = self.files.lock();
        let data = files
            .remove(from)
            .ok_or_else(|| StoreError::NotFound(from.to_path_buf()))?;
        files.insert(to.to_path_buf(), data);
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<(), StoreError> {
        self.check(path)?;
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(path.display().to_string()));
        }
        Ok(())
    }
}

/// Errors that can occur with the local store
#[derive(Debug, Error)]
pub enum StoreError {
    /// File does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage is not available
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    fn io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::Io(err)
        }
    }
}
