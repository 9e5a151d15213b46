// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Version registry
//!
//! A flat `versions.json` map from `"<module>_<lang>"` to the last content
//! version applied locally. A key is written only after its content file
//! has been put in place, so the registry may understate the local version
//! (causing a redundant download) but never overstate it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{atomic_write, LocalStore, StoreError};

/// Registry filename inside the content directory
pub const REGISTRY_FILE: &str = "versions.json";

/// Last applied version per module/language key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRegistry {
    versions: BTreeMap<String, u32>,
}

impl VersionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the registry from `path`.
    ///
    /// A missing or unreadable registry loads as empty, which only ever
    /// causes content to be downloaded again.
    pub async fn load(store: &dyn LocalStore, path: &Path) -> Self {
        let data = match store.read(path).await {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => {
                debug!("No version registry at {}", path.display());
                return Self::new();
            }
            Err(e) => {
                warn!("Failed to read version registry: {}", e);
                return Self::new();
            }
        };

        serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!("Corrupt version registry, starting empty: {}", e);
            Self::new()
        })
    }

    /// Persist the registry atomically
    pub async fn save(&self, store: &dyn LocalStore, path: &Path) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(self)?;
        atomic_write(store, path, &data).await
    }

    /// Version recorded for `key`, 0 if absent
    pub fn get(&self, key: &str) -> u32 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    /// Whether `key` has a recorded version
    pub fn contains(&self, key: &str) -> bool {
        self.versions.contains_key(key)
    }

    /// Record `version` for `key`
    pub fn set(&mut self, key: impl Into<String>, version: u32) {
        self.versions.insert(key.into(), version);
    }

    /// Remove `key`, returning its version
    pub fn remove(&mut self, key: &str) -> Option<u32> {
        self.versions.remove(key)
    }

    /// Iterate over `(key, version)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of recorded keys
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether no keys are recorded
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
