// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exam question banks
//!
//! Typed view of the per-chapter question banks and the mock exam:
//! `{ "data": { "chapter<N>": { chapterID, chapterName, questions } } }`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const CHAPTER_KEY_PREFIX: &str = "chapter";

/// Question bank keyed by "chapter<N>"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamData {
    /// Chapters keyed by "chapter<N>"
    #[serde(default)]
    pub data: BTreeMap<String, Chapter>,
}

impl ExamData {
    /// Chapters ordered by their number; keys without a number are skipped
    pub fn chapters(&self) -> Vec<(u32, &Chapter)> {
        let mut chapters: Vec<(u32, &Chapter)> = self
            .data
            .iter()
            .filter_map(|(key, chapter)| Some((chapter_number(key)?, chapter)))
            .collect();
        chapters.sort_by_key(|(number, _)| *number);
        chapters
    }

    /// Chapter by number
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.data.get(&format!("{}{}", CHAPTER_KEY_PREFIX, number))
    }

    /// Total number of questions across all chapters
    pub fn question_count(&self) -> usize {
        self.data.values().map(|c| c.questions.len()).sum()
    }
}

/// Check that `value` deserializes as a question bank
pub(crate) fn check_shape(value: &Value) -> Result<(), serde_json::Error> {
    ExamData::deserialize(value).map(|_| ())
}

fn chapter_number(key: &str) -> Option<u32> {
    key.strip_prefix(CHAPTER_KEY_PREFIX)?.parse().ok()
}

/// Numeric or textual identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric identifier
    Number(i64),
    /// Textual identifier
    Text(String),
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One chapter's questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapterID")]
    pub chapter_id: Identifier,
    #[serde(rename = "chapterName")]
    pub chapter_name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn one() -> usize {
    1
}

/// A single exam question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Identifier,
    /// Question type as published, e.g. "single" or "multiple"
    #[serde(rename = "type", default)]
    pub kind: String,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_option_indexes: Vec<usize>,
    #[serde(default = "one")]
    pub min_selections: usize,
    #[serde(default = "one")]
    pub max_selections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Question {
    /// Check that `selected` is an acceptable answer shape
    pub fn validate_selection(&self, selected: &[usize]) -> Result<(), AnswerError> {
        let mut seen = BTreeSet::new();
        for &index in selected {
            if index >= self.options.len() {
                return Err(AnswerError::OutOfRange {
                    index,
                    options: self.options.len(),
                });
            }
            if !seen.insert(index) {
                return Err(AnswerError::Duplicate(index));
            }
        }

        if selected.len() < self.min_selections {
            return Err(AnswerError::TooFew {
                min: self.min_selections,
                got: selected.len(),
            });
        }
        if selected.len() > self.max_selections {
            return Err(AnswerError::TooMany {
                max: self.max_selections,
                got: selected.len(),
            });
        }
        Ok(())
    }

    /// Whether `selected` is exactly the set of correct options (order-insensitive)
    pub fn is_correct(&self, selected: &[usize]) -> bool {
        let selected: BTreeSet<usize> = selected.iter().copied().collect();
        let correct: BTreeSet<usize> = self.correct_option_indexes.iter().copied().collect();
        !correct.is_empty() && selected == correct
    }
}

/// Invalid answer selections
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("Option {index} out of range ({options} options)")]
    OutOfRange { index: usize, options: usize },

    #[error("Option {0} selected more than once")]
    Duplicate(usize),

    #[error("Too few selections: need at least {min}, got {got}")]
    TooFew { min: usize, got: usize },

    #[error("Too many selections: at most {max}, got {got}")]
    TooMany { max: usize, got: usize },
}
