// SPDX-License-Identifier: GPL-3.0-only

//! Presentation state and messages

use crate::backends::camera::{CameraDevice, PhotoCodec};
use crate::constants::CapturePreset;
use crate::flash::FlashMode;
use crate::pipelines::photo::{AspectRatio, CapturedPhoto};
use crate::session::PreviewFrame;
use std::sync::Arc;

/// What the capture screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Waiting for the controller to start
    #[default]
    Loading,
    /// Live preview
    Previewing,
    /// Photo requested, waiting for delivery
    Processing,
    /// Showing the captured photo for accept/retake
    Validating,
    /// Photo accepted, camera released
    Accepted,
    /// Camera permission denied
    Unauthorized,
}

impl ViewState {
    /// Whether the live preview is on screen
    pub fn shows_preview(&self) -> bool {
        matches!(self, ViewState::Previewing | ViewState::Processing)
    }
}

/// User intents and controller events
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Lifecycle =====
    /// Screen became visible
    Appear,
    /// Screen went away
    Disappear,

    // ===== Channel events =====
    /// Frame from the preview stream
    PreviewFrame(PreviewFrame),
    /// Photo from the photo stream
    PhotoCaptured(Arc<CapturedPhoto>),

    // ===== Capture flow =====
    Capture,
    Accept,
    Retake,

    // ===== Device selection =====
    SwitchPosition,
    SelectDevice(CameraDevice),

    // ===== Settings =====
    SetPreset(CapturePreset),
    SetCodec(PhotoCodec),
    SetFlash(FlashMode),
    /// Advance to the next flash mode the device supports
    CycleFlash,
    SetRatio(AspectRatio),
    SetZoom(f32),

    /// Clear the visible error
    DismissAlert,
}
