// SPDX-License-Identifier: MPL-2.0

//! Captured still photos
//!
//! ```text
//! photo-ready callback ──▶ decode (callback thread) ──▶ crop (controller) ──▶ photo channel
//! ```
//!
//! A [`CapturedPhoto`] is immutable once built. It is handed to the consumer
//! through the photo channel; the controller keeps only the most recent one.

pub mod crop;
pub mod processing;

pub use crop::{AspectRatio, CropRect};
pub use processing::{DecodedPhoto, crop_to_ratio, decode_raw_photo, finish_photo};

use crate::backends::camera::types::{FrameData, PhotoCodec, SensorRotation};
use crate::flash::FlashMode;
use chrono::{DateTime, Local};
use image::RgbaImage;
use uuid::Uuid;

/// Capture-time metadata of a photo
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoMetadata {
    pub captured_at: DateTime<Local>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    /// Codec the photo was delivered in
    pub codec: PhotoCodec,
    pub flash: FlashMode,
    /// Clockwise rotation needed to display the image upright
    pub orientation: SensorRotation,
    /// Dimensions before cropping
    pub source_width: u32,
    pub source_height: u32,
    /// Crop applied, `None` when the full frame was kept
    pub crop: Option<CropRect>,
}

impl Default for PhotoMetadata {
    fn default() -> Self {
        Self {
            captured_at: Local::now(),
            device_id: None,
            device_name: None,
            codec: PhotoCodec::default(),
            flash: FlashMode::default(),
            orientation: SensorRotation::default(),
            source_width: 0,
            source_height: 0,
            crop: None,
        }
    }
}

/// A finished still photo
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub id: Uuid,
    /// Decoded, cropped pixels
    pub image: RgbaImage,
    /// Encoded bytes as delivered by the hardware (uncropped)
    pub encoded: Option<FrameData>,
    pub metadata: PhotoMetadata,
}

impl CapturedPhoto {
    pub fn new(image: RgbaImage, encoded: Option<FrameData>, metadata: PhotoMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            encoded,
            metadata,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
