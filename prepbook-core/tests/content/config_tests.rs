//! Tests for ContentConfig defaults and builders

use std::path::PathBuf;
use std::time::Duration;

use prepbook_core::content::ContentConfig;

#[test]
fn test_defaults() {
    let config = ContentConfig::default();

    assert_eq!(config.content_url, "https://content.prepbook.app");
    assert_eq!(config.manifest_path, "manifest.json");
    assert_eq!(config.fallback_language, "en");
    assert!(config.remote_updates_enabled);
    assert!(config.legacy_paths);
    assert_eq!(config.check_interval, Duration::from_secs(6 * 3600));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_content_size, 20 * 1024 * 1024);
    assert!(config.proxy_url.is_none());
}

#[test]
fn test_content_dir_is_under_storage_path() {
    let config = ContentConfig {
        storage_path: PathBuf::from("/var/lib/prepbook"),
        ..Default::default()
    };

    assert_eq!(
        config.content_dir(),
        PathBuf::from("/var/lib/prepbook/content")
    );
}

#[test]
fn test_builders() {
    let config = ContentConfig::default()
        .with_proxy("socks5://127.0.0.1:9050".to_string())
        .without_remote_updates()
        .without_legacy_paths();

    assert_eq!(
        config.proxy_url.as_deref(),
        Some("socks5://127.0.0.1:9050")
    );
    assert!(!config.remote_updates_enabled);
    assert!(!config.legacy_paths);
}
