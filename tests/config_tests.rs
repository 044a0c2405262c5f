// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use photobooth::errors::AppError;
use photobooth::pipelines::photo::EncodingQuality;
use photobooth::Config;
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.stream_poll_interval_ms, 500);
    assert!(
        !config.publishing_enabled(),
        "Publishing needs both endpoints"
    );
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "storage_url": "https://files.example/upload", "photo_quality": "Maximum" }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(
        config.storage_url.as_deref(),
        Some("https://files.example/upload")
    );
    assert_eq!(config.photo_quality, EncodingQuality::Maximum);
    assert_eq!(config.recorder_max_fps, Config::default().recorder_max_fps);
    assert!(!config.publishing_enabled());
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        storage_url: Some("https://files.example/upload".into()),
        shortener_url: Some("https://sho.rt/api".into()),
        mirror_preview: false,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.publishing_enabled());
}

#[test]
fn test_blank_endpoint_disables_publishing() {
    let config = Config {
        storage_url: Some("https://files.example/upload".into()),
        shortener_url: Some("   ".into()),
        ..Config::default()
    };
    assert!(!config.publishing_enabled());
}

#[test]
fn test_recorder_config_from_file_values() {
    let config = Config {
        stream_poll_interval_ms: 250,
        recorder_max_fps: 10,
        recorder_max_frames: 100,
        ..Config::default()
    };

    let recorder = config.recorder_config();
    assert_eq!(recorder.poll_interval, Duration::from_millis(250));
    assert_eq!(recorder.max_fps, 10);
    assert_eq!(recorder.max_frames, 100);
    assert_eq!(config.publish_timeout(), Duration::from_secs(30));
}
