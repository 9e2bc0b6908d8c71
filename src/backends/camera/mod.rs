// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The capture core never talks to camera hardware directly. A backend
//! implements the capability traits below and the core drives them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureController  │  ← State machine, owns the session
//! └──────────┬──────────┘
//!            │ open_session / configure / start / capture
//!            ▼
//! ┌─────────────────────┐        ┌─────────────────────┐
//! │ HardwareSession     │ ─────▶ │ FrameSink           │
//! │ (backend pipeline)  │ frame/ │ (callbacks, any     │
//! └─────────────────────┘ photo  │  thread)            │
//!                                └─────────────────────┘
//! ```

pub mod catalog;
pub mod frame_loop;
pub mod types;

pub use catalog::DeviceCatalog;
pub use types::*;

use crate::constants::CapturePreset;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Callback interface the hardware layer invokes when data is ready.
///
/// Both methods may be called from any thread owned by the backend,
/// including synchronously from inside a [`HardwareSession`] call.
pub trait FrameSink: Send + Sync {
    /// A still photo requested through [`HardwareSession::capture_photo`] finished
    fn photo_ready(&self, result: BackendResult<RawPhoto>);

    /// A preview frame is available
    fn frame_ready(&self, frame: CameraFrame);
}

/// An input port wrapping a capture device, ready to attach to a session
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInput {
    pub device: CameraDevice,
}

/// A hardware capture pipeline
///
/// Configuration calls between [`begin_configuration`](Self::begin_configuration)
/// and [`commit_configuration`](Self::commit_configuration) are applied atomically.
pub trait HardwareSession: Send {
    // ===== Configuration transaction =====

    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    // ===== Inputs =====

    /// Wrap a device as an input port
    ///
    /// Fails when the device cannot be opened.
    fn create_input(&mut self, device: &CameraDevice) -> BackendResult<DeviceInput>;

    /// Capability check before attaching an input
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: DeviceInput);

    /// Detach the current device input, if any
    fn remove_input(&mut self);

    // ===== Outputs =====

    /// Capability check before attaching an output
    fn can_add_output(&self, output: OutputKind) -> bool;

    /// Attach an output. Attaching the same output twice is a hardware error.
    fn add_output(&mut self, output: OutputKind) -> BackendResult<()>;

    /// Codecs the attached photo output can encode
    fn supported_codecs(&self) -> Vec<PhotoCodec>;

    // ===== Presets =====

    fn can_set_preset(&self, preset: CapturePreset) -> bool;

    fn set_preset(&mut self, preset: CapturePreset);

    // ===== Device controls =====

    /// Acquire the configuration lock of the bound device
    fn lock_device(&mut self) -> BackendResult<()>;

    fn unlock_device(&mut self);

    /// Set the zoom factor. Requires the device lock.
    fn set_zoom(&mut self, factor: f32);

    /// Enable a continuous auto mode. Requires the device lock.
    fn set_auto_mode(&mut self, mode: AutoMode) -> BackendResult<()>;

    // ===== Running =====

    fn start_running(&mut self);

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// Submit a still capture. Completion arrives via [`FrameSink::photo_ready`].
    fn capture_photo(&mut self, request: &PhotoRequest);
}

/// Capability provider for one camera platform
pub trait CameraBackend: Send + Sync {
    // ===== Enumeration =====

    /// Enumerate every capture device the platform exposes
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Platform default device for a position, used when ranking finds nothing
    fn default_device(&self, position: Position) -> Option<CameraDevice>;

    // ===== Permission =====

    fn authorization_status(&self) -> Authorization;

    /// Ask the user for camera access. Resolves to `true` when granted.
    fn request_access(&self) -> BoxFuture<'static, bool>;

    // ===== Session =====

    /// Create a hardware session that reports frames and photos to `sink`
    fn open_session(&self, sink: Arc<dyn FrameSink>) -> Box<dyn HardwareSession>;
}
