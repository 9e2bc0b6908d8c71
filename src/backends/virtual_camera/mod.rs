// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! A software-only [`CameraBackend`] that exposes a fixed set of synthetic
//! devices. Running sessions emit colour-bar preview frames from a
//! [`FrameLoop`] thread and answer photo requests from a worker thread,
//! the same way a real platform delivers its callbacks off the caller's
//! thread.
//!
//! ```text
//!  start_running ──▶ FrameLoop (30 fps) ──▶ FrameSink::frame_ready
//!  capture_photo ──▶ worker thread ──────▶ FrameSink::photo_ready
//! ```

mod pattern;

pub use pattern::{PREVIEW_HEIGHT, PREVIEW_WIDTH, render_photo, render_preview};

use crate::backends::camera::frame_loop::{FrameLoop, LoopAction};
use crate::backends::camera::{
    Authorization, AutoMode, BackendError, BackendResult, CameraBackend, CameraDevice,
    DeviceInput, FrameSink, HardwareSession, LensType, OutputKind, PhotoCodec, PhotoRequest,
    Position, SensorRotation,
};
use crate::constants::{CapturePreset, VIRTUAL_FRAME_INTERVAL};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Software camera platform with synthetic devices
pub struct VirtualBackend {
    devices: Vec<CameraDevice>,
    authorization: Arc<Mutex<Authorization>>,
    grant_on_request: bool,
}

impl VirtualBackend {
    /// Create an already-authorized backend with the standard device set
    pub fn new() -> Self {
        Self::with_authorization(Authorization::Authorized, true)
    }

    /// Create a backend with a given permission state
    ///
    /// When the state is [`Authorization::NotDetermined`], a permission
    /// request resolves to `grant_on_request`.
    pub fn with_authorization(status: Authorization, grant_on_request: bool) -> Self {
        Self {
            devices: Self::standard_devices(),
            authorization: Arc::new(Mutex::new(status)),
            grant_on_request,
        }
    }

    /// Two back-facing and two front-facing synthetic cameras plus a telephoto
    pub fn standard_devices() -> Vec<CameraDevice> {
        let device = |id: &str,
                      name: &str,
                      position: Position,
                      lens: LensType,
                      max_zoom: f32,
                      has_flash: bool| CameraDevice {
            id: id.to_string(),
            name: name.to_string(),
            position,
            lens,
            rotation: match position {
                Position::Back => SensorRotation::Rotate90,
                Position::Front => SensorRotation::Rotate270,
            },
            min_zoom: 1.0,
            max_zoom,
            has_flash,
        };

        vec![
            device("virtual:back:wide", "Virtual Back Camera", Position::Back, LensType::WideAngle, 16.0, true),
            device("virtual:back:tele", "Virtual Telephoto Camera", Position::Back, LensType::Telephoto, 10.0, true),
            device("virtual:back:triple", "Virtual Triple Camera", Position::Back, LensType::Triple, 123.75, true),
            device("virtual:front:truedepth", "Virtual TrueDepth Camera", Position::Front, LensType::TrueDepth, 8.0, false),
            device("virtual:front:wide", "Virtual Front Camera", Position::Front, LensType::WideAngle, 4.0, false),
        ]
    }

    fn status(&self) -> Authorization {
        *self
            .authorization
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for VirtualBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn default_device(&self, position: Position) -> Option<CameraDevice> {
        self.devices
            .iter()
            .find(|device| device.position == position)
            .cloned()
    }

    fn authorization_status(&self) -> Authorization {
        self.status()
    }

    fn request_access(&self) -> BoxFuture<'static, bool> {
        let authorization = Arc::clone(&self.authorization);
        let grant = self.grant_on_request;
        Box::pin(async move {
            let mut status = authorization
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *status == Authorization::NotDetermined {
                *status = if grant {
                    Authorization::Authorized
                } else {
                    Authorization::Denied
                };
                info!(status = ?*status, "Virtual camera permission decided");
            }
            *status == Authorization::Authorized
        })
    }

    fn open_session(&self, sink: Arc<dyn FrameSink>) -> Box<dyn HardwareSession> {
        Box::new(VirtualSession::new(self.devices.clone(), sink))
    }
}

/// Hardware session of the virtual backend
pub struct VirtualSession {
    known_devices: Vec<CameraDevice>,
    sink: Arc<dyn FrameSink>,
    input: Option<DeviceInput>,
    outputs: Vec<OutputKind>,
    preset: CapturePreset,
    /// f32 bits, shared with the frame loop thread
    zoom: Arc<AtomicU32>,
    device_locked: bool,
    frames: Option<FrameLoop>,
    photo_sequence: u64,
}

impl VirtualSession {
    fn new(known_devices: Vec<CameraDevice>, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            known_devices,
            sink,
            input: None,
            outputs: Vec::new(),
            preset: CapturePreset::default(),
            zoom: Arc::new(AtomicU32::new(1.0f32.to_bits())),
            device_locked: false,
            frames: None,
            photo_sequence: 0,
        }
    }

    fn bound_device(&self) -> Option<&CameraDevice> {
        self.input.as_ref().map(|input| &input.device)
    }
}

impl HardwareSession for VirtualSession {
    fn begin_configuration(&mut self) {
        debug!("Virtual session: begin configuration");
    }

    fn commit_configuration(&mut self) {
        debug!(
            device = ?self.bound_device().map(|d| d.id.as_str()),
            outputs = ?self.outputs,
            preset = %self.preset,
            "Virtual session: commit configuration"
        );
    }

    fn create_input(&mut self, device: &CameraDevice) -> BackendResult<DeviceInput> {
        if !self.known_devices.iter().any(|known| known.id == device.id) {
            return Err(BackendError::DeviceUnavailable(device.id.clone()));
        }
        Ok(DeviceInput {
            device: device.clone(),
        })
    }

    fn can_add_input(&self, _input: &DeviceInput) -> bool {
        self.input.is_none()
    }

    fn add_input(&mut self, input: DeviceInput) {
        self.zoom.store(1.0f32.to_bits(), Ordering::Relaxed);
        self.input = Some(input);
    }

    fn remove_input(&mut self) {
        self.device_locked = false;
        self.input = None;
    }

    fn can_add_output(&self, output: OutputKind) -> bool {
        !self.outputs.contains(&output)
    }

    fn add_output(&mut self, output: OutputKind) -> BackendResult<()> {
        if self.outputs.contains(&output) {
            return Err(BackendError::Rejected(format!(
                "{:?} output already attached",
                output
            )));
        }
        self.outputs.push(output);
        Ok(())
    }

    fn supported_codecs(&self) -> Vec<PhotoCodec> {
        if self.outputs.contains(&OutputKind::Photo) {
            vec![PhotoCodec::Jpeg, PhotoCodec::Png]
        } else {
            Vec::new()
        }
    }

    fn can_set_preset(&self, preset: CapturePreset) -> bool {
        match self.bound_device() {
            Some(device) if device.position == Position::Front => preset != CapturePreset::Uhd4K,
            Some(_) => true,
            None => false,
        }
    }

    fn set_preset(&mut self, preset: CapturePreset) {
        self.preset = preset;
    }

    fn lock_device(&mut self) -> BackendResult<()> {
        if self.input.is_none() {
            return Err(BackendError::LockFailed("no device bound".to_string()));
        }
        self.device_locked = true;
        Ok(())
    }

    fn unlock_device(&mut self) {
        self.device_locked = false;
    }

    fn set_zoom(&mut self, factor: f32) {
        if !self.device_locked {
            warn!("Virtual session: zoom set without device lock");
        }
        self.zoom.store(factor.to_bits(), Ordering::Relaxed);
    }

    fn set_auto_mode(&mut self, mode: AutoMode) -> BackendResult<()> {
        let Some(device) = self.bound_device() else {
            return Err(BackendError::LockFailed("no device bound".to_string()));
        };
        // Front sensors are fixed-focus
        if mode == AutoMode::Focus && device.position == Position::Front {
            return Err(BackendError::Unsupported(format!(
                "{:?} on {}",
                mode, device.name
            )));
        }
        Ok(())
    }

    fn start_running(&mut self) {
        if self.frames.is_some() {
            return;
        }
        let sink = Arc::clone(&self.sink);
        let zoom = Arc::clone(&self.zoom);
        let emits_frames = self.outputs.contains(&OutputKind::Frames) && self.input.is_some();

        self.frames = Some(FrameLoop::start(
            "virtual-preview",
            VIRTUAL_FRAME_INTERVAL,
            move |sequence| {
                if emits_frames {
                    let zoom = f32::from_bits(zoom.load(Ordering::Relaxed));
                    sink.frame_ready(render_preview(sequence, zoom));
                }
                LoopAction::Continue
            },
        ));
        info!("Virtual session running");
    }

    fn stop_running(&mut self) {
        if let Some(mut frames) = self.frames.take() {
            frames.stop();
            info!("Virtual session stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.frames.is_some()
    }

    fn capture_photo(&mut self, request: &PhotoRequest) {
        let sink = Arc::clone(&self.sink);
        let ready = self.input.is_some() && self.outputs.contains(&OutputKind::Photo);
        let (width, height) = self.preset.dimensions();
        let zoom = f32::from_bits(self.zoom.load(Ordering::Relaxed));
        let sequence = self.photo_sequence;
        let codec = request.codec;
        self.photo_sequence += 1;

        debug!(?request, width, height, "Virtual session: capturing photo");

        std::thread::spawn(move || {
            let result = if ready {
                render_photo(width, height, sequence, zoom, codec)
            } else {
                Err(BackendError::CaptureFailed(
                    "session has no bound photo output".to_string(),
                ))
            };
            sink.photo_ready(result);
        });
    }
}

impl Drop for VirtualSession {
    fn drop(&mut self) {
        self.stop_running();
    }
}
