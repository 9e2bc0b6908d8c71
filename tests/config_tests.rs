// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use camera_capture::backends::camera::{PhotoCodec, Position};
use camera_capture::errors::ConfigError;
use camera_capture::{AspectRatio, Config, FlashMode, SessionConfiguration};

#[test]
fn test_config_default() {
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(config.position, Position::Back);
    assert_eq!(config.flash, FlashMode::Off);
    assert_eq!(config.aspect_ratio, AspectRatio::Native);
    assert_eq!(config.warmup_frames, 0, "Warm-up skip should be off by default");
    assert!(config.preview_capacity > 0);
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load(&dir.path().join("absent.json")).expect("load");
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.json");
    let config = Config {
        position: Position::Front,
        codec: PhotoCodec::Png,
        aspect_ratio: AspectRatio::Square,
        warmup_frames: 2,
        ..Config::default()
    };

    config.save(&path).expect("save");
    assert_eq!(Config::load(&path).expect("load"), config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "flash": "Auto" }"#).expect("write");

    let config = Config::load(&path).expect("load");
    assert_eq!(config.flash, FlashMode::Auto);
    assert_eq!(config.codec, PhotoCodec::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").expect("write");

    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_session_configuration_seeded_from_config() {
    let config = Config {
        position: Position::Front,
        flash: FlashMode::On,
        aspect_ratio: AspectRatio::SixteenNine,
        ..Config::default()
    };
    let configuration = SessionConfiguration::from_config(&config);

    assert!(configuration.device.is_none());
    assert_eq!(configuration.position, Position::Front);
    assert_eq!(configuration.flash, FlashMode::On);
    assert_eq!(configuration.aspect_ratio, AspectRatio::SixteenNine);
    assert_eq!(configuration.zoom, 1.0);
}
