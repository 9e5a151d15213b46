// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for ContentManager
//!
//! Scenarios:
//! - Download a language
//! - Check for updates when interval elapsed
//! - Typed access to question banks
//! - Disable remote updates via settings

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use prepbook_core::content::{
    ApplyResult, ContentConfig, ContentManager, ContentModule, FsStore, MockRemote,
    PendingUpdate, UpdateStatus,
};
use serde_json::json;
use tempfile::TempDir;

use super::fixtures::{exam_json, harness, harness_with, mock_manifest, test_config};

#[tokio::test]
async fn test_exam_questions_typed_from_download() {
    let h = harness();
    h.publish_manifest(&json!({
        "modules": {
            "questions": { "version": 1, "path": "exam/questions/questionsByChapter.{lang}.json" }
        }
    }));
    h.publish(
        "exam/questions/questionsByChapter.fr.json",
        &exam_json("Chapitre un"),
    );

    let exam = h.manager.exam_questions("fr").await.unwrap();

    let chapters = exam.chapters();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].0, 1);
    assert_eq!(chapters[0].1.chapter_name, "Chapitre un");
    assert!(chapters[0].1.questions[0].is_correct(&[1]));
}

#[tokio::test]
async fn test_malformed_exam_shape_falls_back_to_english() {
    let h = harness();
    h.publish_manifest(&mock_manifest(1));
    h.publish(
        "exam/mockExam/mockExam.fr.json",
        &json!({ "data": { "chapter1": { "questions": "nope" } } }),
    );

    let exam = h.manager.mock_exam("fr").await.unwrap();

    assert_eq!(exam.chapter(1).unwrap().chapter_name, "Mock Exam");
    assert!(!h.manager.is_downloaded("fr").await);
}

#[tokio::test]
async fn test_bundled_help_documents_in_english() {
    let h = harness_with(test_config().without_remote_updates());

    let privacy = h.manager.privacy_policy("en").await.unwrap();
    let help = h.manager.exam_help("en").await.unwrap();
    let start = h.manager.getting_started("en").await.unwrap();
    let book = h.manager.book_chapters("en").await.unwrap();

    assert_eq!(privacy["title"], "Privacy Policy");
    assert!(help["articles"].as_array().is_some_and(|a| !a.is_empty()));
    assert_eq!(start["title"], "Getting Started");
    assert!(book["chapters"].is_array());
}

#[tokio::test]
async fn test_download_language_reports_applied_and_failed() {
    let h = harness();
    h.publish_manifest(&json!({
        "modules": {
            "mock": { "version": 2, "path": "exam/mockExam/mockExam.{lang}.json" },
            "privacy": { "version": 1, "path": "legal/privacy_policy_{lang}.json" }
        }
    }));
    h.publish("exam/mockExam/mockExam.fr.json", &exam_json("fr"));
    h.publish("legal/privacy_policy_fr.json", &json!({ "title": "Confidentialité" }));

    let result = h.manager.download_language("fr").await;

    let ApplyResult::Applied { applied, failed } = result else {
        panic!("expected Applied, got {:?}", result);
    };
    assert_eq!(
        applied,
        vec![ContentModule::MockExam, ContentModule::PrivacyPolicy]
    );
    assert_eq!(failed.len(), 4);
    assert!(failed.iter().all(|(_, reason)| reason.contains("fell back to en")));
    assert!(h.manager.is_downloaded("fr").await);
}

#[tokio::test]
async fn test_download_language_twice_has_no_updates() {
    let h = harness();
    h.publish_manifest(&mock_manifest(1));
    for module in ContentModule::all() {
        let spec = module.spec();
        let path = if *module == ContentModule::MockExam {
            "exam/mockExam/mockExam.fr.json".to_string()
        } else {
            spec.remote_template.replace("{lang}", "fr")
        };
        h.publish(&path, &json!({ "data": {} }));
    }

    assert!(matches!(
        h.manager.download_language("fr").await,
        ApplyResult::Applied { .. }
    ));
    assert_eq!(h.manager.download_language("fr").await, ApplyResult::NoUpdates);
}

#[tokio::test]
async fn test_download_language_disabled() {
    let h = harness_with(test_config().without_remote_updates());
    assert_eq!(h.manager.download_language("fr").await, ApplyResult::Disabled);
}

#[tokio::test]
async fn test_check_for_updates_lists_pending_modules() {
    let h = harness();
    h.publish_manifest(&json!({
        "modules": {
            "mock": { "version": 3, "path": "exam/mockExam/mockExam.{lang}.json" },
            "privacy": { "version": 1, "path": "legal/privacy_policy_{lang}.json" }
        }
    }));
    h.seed_registry(&[("mock_fr", 2), ("privacy_fr", 1), ("mock_en", 3), ("privacy_en", 1)]);

    let status = h.manager.check_for_updates().await;

    assert_eq!(
        status,
        UpdateStatus::UpdatesAvailable(vec![PendingUpdate {
            module: ContentModule::MockExam,
            language: "fr".to_string(),
            current: 2,
            available: 3,
        }])
    );
    assert!(h.remote.calls().iter().all(|p| p == "manifest.json"));
    assert!(!h.manager.should_check_now().await);
}

#[tokio::test]
async fn test_check_for_updates_up_to_date() {
    let h = harness();
    h.publish_manifest(&mock_manifest(3));
    h.seed_registry(&[("mock_en", 3)]);

    assert_eq!(h.manager.check_for_updates().await, UpdateStatus::UpToDate);
}

#[tokio::test]
async fn test_check_for_updates_fresh_install_is_up_to_date() {
    let h = harness();
    h.publish_manifest(&json!({
        "modules": {
            "mock": { "version": 3, "path": "exam/mockExam/mockExam.{lang}.json" },
            "privacy": { "version": 1, "path": "legal/privacy_policy_{lang}.json" }
        }
    }));

    assert_eq!(h.manager.check_for_updates().await, UpdateStatus::UpToDate);
}

#[tokio::test]
async fn test_check_for_updates_offline_fails() {
    let h = harness();
    h.remote.set_offline(true);

    assert!(matches!(
        h.manager.check_for_updates().await,
        UpdateStatus::CheckFailed(_)
    ));
}

#[tokio::test]
async fn test_check_for_updates_disabled() {
    let h = harness_with(test_config().without_remote_updates());
    assert_eq!(h.manager.check_for_updates().await, UpdateStatus::Disabled);
    assert!(!h.manager.should_check_now().await);
}

#[tokio::test]
async fn test_should_check_when_never_checked() {
    let h = harness();
    assert!(h.manager.should_check_now().await);
}

#[tokio::test]
async fn test_should_check_when_interval_elapsed() {
    let h = harness_with(ContentConfig {
        check_interval: Duration::from_secs(60),
        ..test_config()
    });

    let two_minutes_ago = SystemTime::now() - Duration::from_secs(120);
    h.manager.set_last_check_time(two_minutes_ago).await.unwrap();
    assert!(h.manager.should_check_now().await);

    h.manager.record_check_time().await.unwrap();
    assert!(!h.manager.should_check_now().await);
}

#[tokio::test]
async fn test_available_languages_from_manifest() {
    let h = harness();
    h.publish_manifest(&json!({
        "modules": {},
        "languages": [ { "code": "en", "name": "English" }, { "code": "fr", "name": "Français" } ]
    }));

    let codes: Vec<String> = h
        .manager
        .available_languages()
        .await
        .into_iter()
        .map(|l| l.code)
        .collect();

    assert_eq!(codes, vec!["en".to_string(), "fr".to_string()]);
}

#[tokio::test]
async fn test_available_languages_defaults_to_english() {
    let h = harness();
    h.remote.set_offline(true);

    let languages = h.manager.available_languages().await;

    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].code, "en");
}

#[tokio::test]
async fn test_downloaded_languages_always_include_english() {
    let h = harness();
    h.seed_registry(&[("mock_fr", 1), ("getting_started_es", 2)]);

    let languages: Vec<String> = h.manager.downloaded_languages().await.into_iter().collect();

    assert_eq!(
        languages,
        vec!["en".to_string(), "es".to_string(), "fr".to_string()]
    );
}

#[tokio::test]
async fn test_filesystem_end_to_end_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let config = ContentConfig {
        storage_path: temp.path().to_path_buf(),
        ..Default::default()
    };
    let remote = Arc::new(
        MockRemote::new()
            .with_blob(
                "manifest.json",
                serde_json::to_vec(&mock_manifest(3)).unwrap(),
            )
            .with_blob(
                "exam/mockExam/mockExam.fr.json",
                serde_json::to_vec(&exam_json("disk")).unwrap(),
            ),
    );
    let manager = ContentManager::new(config, Arc::new(FsStore::new()), remote.clone());

    let exam = manager.mock_exam("fr").await.unwrap();
    assert_eq!(exam.chapter(1).unwrap().chapter_name, "disk");

    let content_dir = temp.path().join("content");
    let mut names: Vec<String> = std::fs::read_dir(&content_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "manifest.json".to_string(),
            "mockExam.fr.json".to_string(),
            "versions.json".to_string(),
        ]
    );

    // Second load is served from disk
    remote.clear_calls();
    manager.mock_exam("fr").await.unwrap();
    assert_eq!(remote.calls(), vec!["manifest.json".to_string()]);
}
