// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::constants::{CapturePreset, QualityPrioritization};
use crate::flash::FlashMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Frame pixel storage shared between the hardware thread and consumers
pub type FrameData = Arc<[u8]>;

/// Which side of the device a camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    /// Rear-mounted camera (default)
    #[default]
    Back,
    /// Front-mounted (selfie) camera
    Front,
}

impl Position {
    /// The opposite facing position
    pub fn toggled(self) -> Self {
        match self {
            Position::Back => Position::Front,
            Position::Front => Position::Back,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Back => write!(f, "back"),
            Position::Front => write!(f, "front"),
        }
    }
}

/// Physical lens arrangement of a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensType {
    /// Triple camera (ultra-wide + wide + telephoto)
    Triple,
    /// Dual wide camera (ultra-wide + wide)
    DualWide,
    /// Dual camera (wide + telephoto)
    Dual,
    UltraWide,
    WideAngle,
    Telephoto,
    /// LiDAR or structured-light depth camera
    Depth,
    /// Front true-depth camera
    TrueDepth,
    Microphone,
    External,
}

impl LensType {
    /// Ranking used by the device catalog; lower sorts first.
    ///
    /// Multi-lens devices come before single-lens ones, depth and
    /// non-camera devices last.
    pub fn priority(&self) -> u8 {
        match self {
            LensType::Triple => 0,
            LensType::DualWide => 1,
            LensType::Dual => 2,
            LensType::UltraWide => 3,
            LensType::WideAngle => 4,
            LensType::Telephoto => 5,
            LensType::Depth | LensType::TrueDepth => 6,
            LensType::Microphone | LensType::External => 7,
        }
    }
}

/// Sensor rotation in degrees (clockwise)
///
/// Camera sensors may be physically mounted at various angles relative to the device.
/// This is common on mobile devices where sensors are rotated 90° or 270° relative
/// to the display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Compose two clockwise rotations
    pub fn then(self, other: SensorRotation) -> Self {
        Self::from_degrees_int((self.degrees() + other.degrees()) as i32)
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Represents a capture device reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDevice {
    /// Stable backend identifier
    pub id: String,
    pub name: String,
    pub position: Position,
    pub lens: LensType,
    /// Sensor mounting rotation relative to the device's natural orientation
    pub rotation: SensorRotation,
    /// Device-reported zoom range
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Whether the device has a flash unit
    pub has_flash: bool,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {:?})", self.name, self.position, self.lens)
    }
}

/// Pixel format of a preview frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// BGRA - 32-bit with alpha (B G R A byte order)
    BGRA,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::RGBA | Self::BGRA => 4,
            Self::Gray8 => 1,
        }
    }
}

/// A single preview frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: FrameData,
    pub format: PixelFormat,
    /// Row stride in bytes
    pub stride: u32,
    /// Display rotation to apply, written by the controller before emission
    pub rotation: SensorRotation,
    /// Frame sequence number assigned by the backend
    pub sequence: u64,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

/// Encoding requested for a still photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PhotoCodec {
    /// Efficient compression (HEVC/HEIF on hardware that has it)
    #[default]
    Hevc,
    /// Legacy JPEG
    Jpeg,
    /// Lossless PNG
    Png,
}

impl PhotoCodec {
    pub const ALL: [PhotoCodec; 3] = [PhotoCodec::Hevc, PhotoCodec::Jpeg, PhotoCodec::Png];

    pub fn display_name(&self) -> &'static str {
        match self {
            PhotoCodec::Hevc => "HEIF",
            PhotoCodec::Jpeg => "JPEG",
            PhotoCodec::Png => "PNG",
        }
    }
}

/// Outputs attached to the hardware session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Still-photo output
    Photo,
    /// Per-frame preview output
    Frames,
}

/// Auto-adjustment a device may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoMode {
    /// Continuous auto-focus
    Focus,
    /// Continuous auto-exposure
    Exposure,
    /// Continuous auto white balance
    WhiteBalance,
}

impl AutoMode {
    pub const ALL: [AutoMode; 3] = [AutoMode::Focus, AutoMode::Exposure, AutoMode::WhiteBalance];
}

/// A still-photo capture request handed to the hardware
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRequest {
    pub codec: PhotoCodec,
    pub flash: FlashMode,
    pub prioritization: QualityPrioritization,
    pub preset: CapturePreset,
}

/// Raw photo as delivered by the hardware photo-ready callback
#[derive(Debug, Clone)]
pub enum RawPhoto {
    /// Encoded image bytes (JPEG, PNG, ...)
    Encoded { data: FrameData, codec: PhotoCodec },
    /// Uncompressed RGBA pixels
    Rgba {
        width: u32,
        height: u32,
        data: FrameData,
    },
}

/// Camera permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The user has not been asked yet
    NotDetermined,
    Authorized,
    Denied,
    /// Blocked by policy; the user cannot grant access
    Restricted,
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types reported by a hardware backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The session's capability check rejected the attach
    Rejected(String),
    /// The device could not be opened or wrapped
    DeviceUnavailable(String),
    /// The device configuration lock is held elsewhere
    LockFailed(String),
    /// A delivered photo could not be decoded
    Decode(String),
    /// The capture itself failed in hardware
    CaptureFailed(String),
    /// The setting is not supported by this device
    Unsupported(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Rejected(msg) => write!(f, "Rejected by session: {}", msg),
            BackendError::DeviceUnavailable(msg) => write!(f, "Device unavailable: {}", msg),
            BackendError::LockFailed(msg) => write!(f, "Device lock failed: {}", msg),
            BackendError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_composition() {
        assert_eq!(
            SensorRotation::Rotate90.then(SensorRotation::Rotate270),
            SensorRotation::None
        );
        assert_eq!(
            SensorRotation::Rotate180.then(SensorRotation::Rotate90),
            SensorRotation::Rotate270
        );
        assert!(SensorRotation::Rotate270.swaps_dimensions());
    }

    #[test]
    fn test_lens_priority_order() {
        let ordered = [
            LensType::Triple,
            LensType::DualWide,
            LensType::Dual,
            LensType::UltraWide,
            LensType::WideAngle,
            LensType::Telephoto,
            LensType::TrueDepth,
            LensType::External,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].priority() < pair[1].priority(), "{:?}", pair);
        }
    }

    #[test]
    fn test_position_toggle() {
        assert_eq!(Position::Back.toggled(), Position::Front);
        assert_eq!(Position::Front.toggled().toggled(), Position::Front);
    }
}
