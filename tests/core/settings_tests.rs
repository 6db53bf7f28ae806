//! Tests for user settings
//!
//! Tests cover:
//! - Defaults and partial settings files
//! - Downsampler and store derived from settings

use std::path::PathBuf;

use crate::common::{scratch_dir, stream_with};
use sensorlabel::settings::Settings;
use sensorlabel::state::DEFAULT_LABEL_WIDTH;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.version, 1);
    assert!(settings.downsampling);
    assert_eq!(settings.default_label_width, DEFAULT_LABEL_WIDTH);
    assert!(settings.storage_dir.is_none());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let settings: Settings = serde_json::from_str(r#"{"downsampling": false}"#).unwrap();
    assert!(!settings.downsampling);
    assert_eq!(settings.default_label_width, DEFAULT_LABEL_WIDTH);
}

#[test]
fn test_json_round_trip() {
    let settings = Settings {
        default_label_width: 250.0,
        storage_dir: Some(PathBuf::from("labels")),
        ..Settings::default()
    };
    let json = serde_json::to_string(&settings).unwrap();
    let back: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn test_downsampler_follows_flag() {
    let settings = Settings {
        downsampling: false,
        ..Settings::default()
    };
    assert!(!settings.downsampler().enabled);
    assert!(Settings::default().downsampler().enabled);
}

#[test]
fn test_store_uses_storage_dir() {
    let dir = scratch_dir("sensorlabel-settings");
    let settings = Settings {
        storage_dir: Some(dir.clone()),
        ..Settings::default()
    };
    assert_eq!(settings.store().unwrap().root(), dir.as_path());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_create_label_follows_configured_width() {
    let settings = Settings {
        default_label_width: 250.0,
        ..Settings::default()
    };
    let mut stream = stream_with(&[(0.0, 1000.0)]);

    let id = settings.create_label(&mut stream, 2000.0, 1).unwrap();
    let label = stream.get(id).unwrap();
    assert_eq!((label.start, label.end), (1875.0, 2125.0));
    assert!(label.selected);

    // Clamped against the neighbour like any other create
    let id = settings.create_label(&mut stream, 1100.0, 1).unwrap();
    let label = stream.get(id).unwrap();
    assert_eq!((label.start, label.end), (1000.0, 1225.0));
}
