// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for deleting downloaded languages
//!
//! Scenarios:
//! - English can never be deleted
//! - Deleting a language removes only its files and versions

use std::sync::Arc;

use prepbook_core::content::{ContentConfig, ContentError, ContentManager, FsStore, MockRemote};
use serde_json::json;
use tempfile::TempDir;

use super::fixtures::{content_path, exam_json, harness};

fn seed_two_languages(h: &super::fixtures::Harness) {
    h.seed_registry(&[
        ("mock_en", 3),
        ("mock_fr", 3),
        ("mock_es", 2),
        ("privacy_fr", 1),
        ("getting_started_fr", 4),
        ("privacy_en", 1),
    ]);
    h.seed_file("mockExam.en.json", &exam_json("en"));
    h.seed_file("mockExam.fr.json", &exam_json("fr"));
    h.seed_file("mockExam.es.json", &exam_json("es"));
    h.seed_file("privacy_policy_fr.json", &json!({ "title": "Confidentialité" }));
    h.seed_file("getting_started_help.fr.json", &json!({ "title": "Démarrer" }));
    h.seed_file("privacy_policy_en.json", &json!({ "title": "Privacy" }));
}

#[tokio::test]
async fn test_delete_english_is_noop() {
    let h = harness();
    seed_two_languages(&h);
    let before = h.store.paths();

    let report = h.manager.delete_language("en").await.unwrap();

    assert!(report.removed_files.is_empty());
    assert!(report.removed_keys.is_empty());
    assert_eq!(h.store.paths(), before);
    assert_eq!(h.registry()["mock_en"], 3);
    assert_eq!(h.registry()["privacy_en"], 1);
}

#[tokio::test]
async fn test_delete_french_removes_only_french() {
    let h = harness();
    seed_two_languages(&h);

    let mut report = h.manager.delete_language("fr").await.unwrap();
    report.removed_files.sort();
    report.removed_keys.sort();

    assert_eq!(
        report.removed_files,
        vec![
            "getting_started_help.fr.json".to_string(),
            "mockExam.fr.json".to_string(),
            "privacy_policy_fr.json".to_string(),
        ]
    );
    assert_eq!(
        report.removed_keys,
        vec![
            "getting_started_fr".to_string(),
            "mock_fr".to_string(),
            "privacy_fr".to_string(),
        ]
    );
    assert_eq!(
        h.registry(),
        json!({ "mock_en": 3, "mock_es": 2, "privacy_en": 1 })
    );
    assert!(h.local("mockExam.en.json").is_some());
    assert!(h.local("mockExam.es.json").is_some());
    assert!(h.local("privacy_policy_fr.json").is_none());
}

#[tokio::test]
async fn test_delete_rejects_path_like_language() {
    let h = harness();
    seed_two_languages(&h);
    let before = h.store.paths();

    let result = h.manager.delete_language("../content/mockExam.fr").await;

    assert!(matches!(result, Err(ContentError::InvalidLanguage(_))));
    assert_eq!(h.store.paths(), before);
}

#[tokio::test]
async fn test_failed_file_removal_does_not_stop_others() {
    let h = harness();
    seed_two_languages(&h);
    h.store.fail_path(content_path("mockExam.fr.json"));

    let report = h.manager.delete_language("fr").await.unwrap();

    assert_eq!(report.failed_files.len(), 1);
    assert_eq!(report.failed_files[0].0, "mockExam.fr.json");
    assert_eq!(report.removed_files.len(), 2);
    assert!(h.local("privacy_policy_fr.json").is_none());
    assert!(h.registry().get("mock_fr").is_none());
}

#[tokio::test]
async fn test_deleted_language_is_downloaded_again_on_next_request() {
    let h = harness();
    seed_two_languages(&h);
    h.publish_manifest(&super::fixtures::mock_manifest(3));
    h.publish("exam/mockExam/mockExam.fr.json", &exam_json("fr-v3"));

    h.manager.delete_language("fr").await.unwrap();
    let questions = h.manager.mock_exam("fr").await.unwrap();

    assert_eq!(questions.chapter(1).unwrap().chapter_name, "fr-v3");
    assert_eq!(h.registry()["mock_fr"], 3);
}

#[tokio::test]
async fn test_delete_language_on_filesystem() {
    let temp = TempDir::new().unwrap();
    let config = ContentConfig {
        storage_path: temp.path().to_path_buf(),
        ..Default::default()
    };
    let remote = Arc::new(
        MockRemote::new()
            .with_blob(
                "manifest.json",
                serde_json::to_vec(&super::fixtures::mock_manifest(1)).unwrap(),
            )
            .with_blob(
                "exam/mockExam/mockExam.fr.json",
                serde_json::to_vec(&exam_json("fr")).unwrap(),
            ),
    );
    let manager = ContentManager::new(config, Arc::new(FsStore::new()), remote);

    manager.mock_exam("fr").await.unwrap();
    let file = temp.path().join("content/mockExam.fr.json");
    assert!(file.exists());

    manager.delete_language("fr").await.unwrap();

    assert!(!file.exists());
    assert!(!manager.is_downloaded("fr").await);
}
