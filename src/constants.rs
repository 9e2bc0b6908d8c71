// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling applied on top of the device-reported maximum zoom factor
pub const MAX_ZOOM_FACTOR: f32 = 25.0;

/// Lowest zoom factor the controller will apply
pub const MIN_ZOOM_FACTOR: f32 = 1.0;

/// Preview frames discarded after the preview channel is (re)created.
///
/// Zero by default. Set to [`LAGGING_ORIENTATION_WARMUP_FRAMES`] on hardware
/// whose orientation metadata lags behind reconfiguration.
pub const DEFAULT_WARMUP_FRAMES: u32 = 0;

/// Warm-up skip count for hardware with lagging orientation metadata
pub const LAGGING_ORIENTATION_WARMUP_FRAMES: u32 = 2;

/// Preview frames buffered for a slow consumer before new frames are dropped
pub const DEFAULT_PREVIEW_CAPACITY: usize = 4;

/// Frame interval of the virtual backend's test pattern (30 fps)
pub const VIRTUAL_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Log preview statistics once every this many frames
pub const FRAME_LOG_INTERVAL: u64 = 30;

/// Capture resolution/quality tier the hardware session can be set to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CapturePreset {
    /// Full-resolution still photo capture (default)
    #[default]
    Photo,
    /// Highest quality the session supports
    High,
    /// Balanced quality
    Medium,
    /// Lowest quality, smallest buffers
    Low,
    /// 1280x720
    Hd720,
    /// 1920x1080
    Hd1080,
    /// 3840x2160
    Uhd4K,
}

impl CapturePreset {
    /// All presets for settings lists
    pub const ALL: [CapturePreset; 7] = [
        CapturePreset::Photo,
        CapturePreset::High,
        CapturePreset::Medium,
        CapturePreset::Low,
        CapturePreset::Hd720,
        CapturePreset::Hd1080,
        CapturePreset::Uhd4K,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            CapturePreset::Photo => "Photo",
            CapturePreset::High => "High",
            CapturePreset::Medium => "Medium",
            CapturePreset::Low => "Low",
            CapturePreset::Hd720 => "720p",
            CapturePreset::Hd1080 => "1080p",
            CapturePreset::Uhd4K => "4K",
        }
    }

    /// Output dimensions (landscape) the virtual backend produces for this preset
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CapturePreset::Photo => (4032, 3024),
            CapturePreset::High => (1920, 1440),
            CapturePreset::Medium => (640, 480),
            CapturePreset::Low => (192, 144),
            CapturePreset::Hd720 => (1280, 720),
            CapturePreset::Hd1080 => (1920, 1080),
            CapturePreset::Uhd4K => (3840, 2160),
        }
    }
}

impl std::fmt::Display for CapturePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How the hardware trades capture latency against image quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityPrioritization {
    /// Fastest shot-to-shot time
    Speed,
    /// Balanced (default)
    #[default]
    Balanced,
    /// Best image quality, slowest capture
    Quality,
}

impl QualityPrioritization {
    pub const ALL: [QualityPrioritization; 3] = [
        QualityPrioritization::Speed,
        QualityPrioritization::Balanced,
        QualityPrioritization::Quality,
    ];

    /// Get display name for the prioritization
    pub fn display_name(&self) -> &'static str {
        match self {
            QualityPrioritization::Speed => "Speed",
            QualityPrioritization::Balanced => "Balanced",
            QualityPrioritization::Quality => "Quality",
        }
    }
}
