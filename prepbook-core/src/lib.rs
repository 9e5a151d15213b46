// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Prepbook Core Library
//!
//! Keeps localized exam and e-book content in sync with a remote manifest.
//! Content is versioned per module and language, cached locally, and
//! served with fallback to English and to bundled defaults.

pub mod content;

pub use content::{
    ContentConfig, ContentError, ContentManager, ContentModule, ContentSource, ExamData,
    LocalStore, Manifest, RemoteSource, Synced,
};
