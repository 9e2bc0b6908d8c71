// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use camera_capture::constants::{
    CapturePreset, LAGGING_ORIENTATION_WARMUP_FRAMES, MAX_ZOOM_FACTOR, MIN_ZOOM_FACTOR,
    QualityPrioritization,
};

#[test]
fn test_zoom_bounds() {
    assert_eq!(MIN_ZOOM_FACTOR, 1.0);
    assert_eq!(MAX_ZOOM_FACTOR, 25.0);
}

#[test]
fn test_lagging_orientation_warmup() {
    assert_eq!(LAGGING_ORIENTATION_WARMUP_FRAMES, 2);
}

#[test]
fn test_preset_dimensions_are_landscape() {
    for preset in CapturePreset::ALL {
        let (width, height) = preset.dimensions();
        assert!(
            width >= height,
            "Preset {:?} should report landscape dimensions",
            preset
        );
    }
}

#[test]
fn test_display_names() {
    // Test that all presets have non-empty display names
    for preset in CapturePreset::ALL {
        assert!(
            !preset.display_name().is_empty(),
            "Preset {:?} has empty display name",
            preset
        );
    }
    for prioritization in QualityPrioritization::ALL {
        assert!(!prioritization.display_name().is_empty());
    }
}
