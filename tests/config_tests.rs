// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use framescan::{AppError, ScanConfig};
use std::io::Write;

#[test]
fn test_config_default() {
    let config = ScanConfig::default();

    assert_eq!(config.thread_name, "frame-scan");
    assert_eq!(
        config.max_dimension, None,
        "Frames should be scanned at full resolution by default"
    );
    assert!(config.queue_warn_len > 0);
}

#[test]
fn test_partial_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "max_dimension": 640 }}"#).unwrap();

    let config = ScanConfig::load(file.path()).unwrap();
    assert_eq!(config.max_dimension, Some(640));
    assert_eq!(config.thread_name, ScanConfig::default().thread_name);
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let result = ScanConfig::load_or_default(Some(missing.as_path()));
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_malformed_config_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    assert!(matches!(
        ScanConfig::load(file.path()),
        Err(AppError::Config(_))
    ));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = ScanConfig {
        thread_name: "qr".to_string(),
        max_dimension: Some(800),
        queue_warn_len: 4,
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: ScanConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
