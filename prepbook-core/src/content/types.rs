// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content type definitions for remote content synchronization
//!
//! These types represent the master manifest, the closed set of content
//! modules, and the result of resolving one module for one language.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::bundled;
use super::exam;

/// Version assumed for a module the manifest does not list
pub const DEFAULT_MODULE_VERSION: u32 = 1;

/// Placeholder substituted with a language code in path templates
const LANG_PLACEHOLDER: &str = "{lang}";

/// Master manifest from the remote content source
///
/// Maps each module key to the latest published version and the remote
/// path template it can be downloaded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Module entries keyed by module key (e.g. "mock", "privacy")
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
    /// Languages offered for download
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageEntry>,
}

impl Manifest {
    /// Look up the entry for a module key
    pub fn entry(&self, module_key: &str) -> Option<&ModuleEntry> {
        self.modules.get(module_key)
    }
}

/// A single module entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Monotonic content version
    pub version: u32,
    /// Remote path template with a `{lang}` placeholder
    pub path: String,
    /// Optional SHA-256 checksum in format "sha256:hexstring"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ModuleEntry {
    /// Remote path for the given language
    pub fn resolve_path(&self, lang: &str) -> String {
        expand_template(&self.path, lang)
    }
}

/// A language advertised by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// Language code, e.g. "fr"
    pub code: String,
    /// Display name, e.g. "Français"
    #[serde(default)]
    pub name: String,
}

/// Substitute `{lang}` in a path or filename template
pub fn expand_template(template: &str, lang: &str) -> String {
    template.replace(LANG_PLACEHOLDER, lang)
}

/// Downloadable content modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentModule {
    /// E-book chapters
    BookChapters,
    /// Exam question banks grouped by chapter
    ChapterQuestions,
    /// Mock exam question bank
    MockExam,
    /// Privacy policy
    PrivacyPolicy,
    /// General exam help articles
    ExamHelp,
    /// Getting-started guide
    GettingStarted,
}

impl ContentModule {
    /// All content modules
    pub fn all() -> &'static [ContentModule] {
        &[
            ContentModule::BookChapters,
            ContentModule::ChapterQuestions,
            ContentModule::MockExam,
            ContentModule::PrivacyPolicy,
            ContentModule::ExamHelp,
            ContentModule::GettingStarted,
        ]
    }

    /// Manifest and registry key for this module
    pub fn key(&self) -> &'static str {
        match self {
            ContentModule::BookChapters => "chapter",
            ContentModule::ChapterQuestions => "questions",
            ContentModule::MockExam => "mock",
            ContentModule::PrivacyPolicy => "privacy",
            ContentModule::ExamHelp => "help",
            ContentModule::GettingStarted => "getting_started",
        }
    }

    /// Parse a module from its key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.key() == key)
    }

    /// Build the sync parameters for this module
    pub fn spec(&self) -> ModuleSpec {
        match self {
            ContentModule::BookChapters => ModuleSpec {
                key: self.key(),
                local_template: "allChaptersData.{lang}.json",
                remote_template: "book/chapters/allChaptersData.{lang}.json",
                legacy_templates: &["chapters/allChaptersData.{lang}.json"],
                bundled: bundled::book_chapters,
                validate: any_json,
            },
            ContentModule::ChapterQuestions => ModuleSpec {
                key: self.key(),
                local_template: "questionsByChapter.{lang}.json",
                remote_template: "exam/questions/questionsByChapter.{lang}.json",
                legacy_templates: &[
                    "exam/questions/questionsByChapter_{lang}.json",
                    "questions/questionsByChapter.{lang}.json",
                ],
                bundled: bundled::chapter_questions,
                validate: exam::check_shape,
            },
            ContentModule::MockExam => ModuleSpec {
                key: self.key(),
                local_template: "mockExam.{lang}.json",
                remote_template: "exam/mockExam/mockExam.{lang}.json",
                legacy_templates: &["exam/mock/mockExam.{lang}.json"],
                bundled: bundled::mock_exam,
                validate: exam::check_shape,
            },
            ContentModule::PrivacyPolicy => ModuleSpec {
                key: self.key(),
                local_template: "privacy_policy_{lang}.json",
                remote_template: "legal/privacy_policy_{lang}.json",
                legacy_templates: &[],
                bundled: bundled::privacy_policy,
                validate: any_json,
            },
            ContentModule::ExamHelp => ModuleSpec {
                key: self.key(),
                local_template: "exam_help.{lang}.json",
                remote_template: "help/exam_help.{lang}.json",
                legacy_templates: &[],
                bundled: bundled::exam_help,
                validate: any_json,
            },
            ContentModule::GettingStarted => ModuleSpec {
                key: self.key(),
                local_template: "getting_started_help.{lang}.json",
                remote_template: "help/getting_started_help.{lang}.json",
                legacy_templates: &[],
                bundled: bundled::getting_started,
                validate: any_json,
            },
        }
    }
}

impl std::fmt::Display for ContentModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Parameters for syncing one module
///
/// Every module runs the same sync routine; only these parameters differ.
#[derive(Clone, Copy)]
pub struct ModuleSpec {
    /// Module key used in the manifest and the version registry
    pub key: &'static str,
    /// Local filename template with a `{lang}` placeholder
    pub local_template: &'static str,
    /// Remote path template used when the manifest has no entry
    pub remote_template: &'static str,
    /// Historical remote path templates, probed after the current one
    pub legacy_templates: &'static [&'static str],
    /// Content compiled into the binary, per language
    pub bundled: fn(&str) -> Option<Value>,
    /// Shape check applied to downloaded and local content before use
    pub validate: fn(&Value) -> Result<(), serde_json::Error>,
}

fn any_json(_: &Value) -> Result<(), serde_json::Error> {
    Ok(())
}

impl std::fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("key", &self.key)
            .field("local_template", &self.local_template)
            .field("remote_template", &self.remote_template)
            .field("legacy_templates", &self.legacy_templates)
            .finish_non_exhaustive()
    }
}

impl ModuleSpec {
    /// Registry key, e.g. "mock_fr"
    pub fn version_key(&self, lang: &str) -> String {
        format!("{}_{}", self.key, lang)
    }

    /// Local filename for the given language
    ///
    /// `lang` must already have passed [`is_valid_language`].
    pub fn local_filename(&self, lang: &str) -> String {
        expand_template(self.local_template, lang)
    }
}

/// Whether `lang` is safe to embed in file names and remote paths
///
/// Accepts `[A-Za-z0-9_-]+`.
pub fn is_valid_language(lang: &str) -> bool {
    !lang.is_empty()
        && lang
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Where resolved content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Freshly downloaded and applied
    Downloaded,
    /// Local copy already at the manifest version
    Cached,
    /// Local copy served because the update failed
    Stale,
    /// Compiled-in default
    Bundled,
}

/// Result of resolving one module for one language
#[derive(Debug, Clone)]
pub struct Synced {
    /// Module key
    pub module: String,
    /// Language the content is actually in (may differ from the request)
    pub language: String,
    /// Parsed JSON content
    pub content: Value,
    /// Where the content came from
    pub source: ContentSource,
    /// Registry version of the served copy (`None` for bundled content)
    pub version: Option<u32>,
}
