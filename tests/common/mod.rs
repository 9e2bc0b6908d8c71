// SPDX-License-Identifier: GPL-3.0-only

//! Scriptable fake hardware for integration tests
//!
//! Unlike the virtual backend, the fake never spawns threads: photos are
//! delivered synchronously from inside `capture_photo` and preview frames
//! only arrive when a test pushes them with [`FakeBackend::push_frame`].

#![allow(dead_code)]

use camera_capture::backends::camera::{
    Authorization, AutoMode, BackendError, BackendResult, CameraBackend, CameraDevice,
    CameraFrame, DeviceInput, FrameSink, HardwareSession, LensType, OutputKind, PhotoCodec,
    PhotoRequest, PixelFormat, Position, RawPhoto, SensorRotation,
};
use camera_capture::CapturePreset;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Knobs a test flips to make the fake misbehave
#[derive(Debug, Clone)]
pub struct Script {
    pub authorization: Authorization,
    /// Answer to a permission request while `NotDetermined`
    pub grant_on_request: bool,
    pub reject_input: bool,
    pub reject_output: bool,
    pub fail_lock: bool,
    /// Deliver a failed photo instead of an image
    pub fail_photo: bool,
    /// Keep photo callbacks until [`FakeBackend::release_photos`]
    pub hold_photos: bool,
    /// Size of delivered photos
    pub photo_size: (u32, u32),
}

impl Default for Script {
    fn default() -> Self {
        Self {
            authorization: Authorization::Authorized,
            grant_on_request: true,
            reject_input: false,
            reject_output: false,
            fail_lock: false,
            fail_photo: false,
            hold_photos: false,
            photo_size: (40, 30),
        }
    }
}

/// What the fake session has been asked to do
#[derive(Debug, Default)]
pub struct Record {
    pub running: bool,
    pub input: Option<String>,
    pub outputs: Vec<OutputKind>,
    pub preset: Option<CapturePreset>,
    pub zoom: f32,
    pub photo_requests: Vec<PhotoRequest>,
    pub sessions_opened: usize,
}

#[derive(Default)]
struct Shared {
    script: Script,
    record: Record,
    sink: Option<Arc<dyn FrameSink>>,
    frame_sequence: u64,
    held_photos: Vec<BackendResult<RawPhoto>>,
}

/// Fake camera platform, cheap to clone and inspect from tests
#[derive(Clone)]
pub struct FakeBackend {
    devices: Vec<CameraDevice>,
    shared: Arc<Mutex<Shared>>,
}

pub fn device(id: &str, position: Position, lens: LensType, max_zoom: f32) -> CameraDevice {
    CameraDevice {
        id: id.to_string(),
        name: id.to_string(),
        position,
        lens,
        rotation: SensorRotation::Rotate90,
        min_zoom: 1.0,
        max_zoom,
        has_flash: position == Position::Back,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_script(Script::default())
    }

    pub fn with_script(script: Script) -> Self {
        Self {
            devices: vec![
                device("back-wide", Position::Back, LensType::WideAngle, 10.0),
                device("back-dual", Position::Back, LensType::DualWide, 50.0),
                device("front", Position::Front, LensType::TrueDepth, 4.0),
            ],
            shared: Arc::new(Mutex::new(Shared {
                script,
                record: Record {
                    zoom: 1.0,
                    ..Record::default()
                },
                ..Shared::default()
            })),
        }
    }

    pub fn device(&self, id: &str) -> CameraDevice {
        self.devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .expect("known fake device")
    }

    /// Change the script mid-test
    pub fn script(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.shared.lock().unwrap().script);
    }

    pub fn authorization(&self) -> Authorization {
        self.shared.lock().unwrap().script.authorization
    }

    /// Inspect what the session was asked to do
    pub fn record<T>(&self, read: impl FnOnce(&Record) -> T) -> T {
        read(&self.shared.lock().unwrap().record)
    }

    /// Deliver one preview frame through the registered sink
    pub fn push_frame(&self) {
        let (sink, sequence) = {
            let mut shared = self.shared.lock().unwrap();
            let sequence = shared.frame_sequence;
            shared.frame_sequence += 1;
            (shared.sink.clone(), sequence)
        };
        if let Some(sink) = sink {
            sink.frame_ready(frame(sequence));
        }
    }

    /// Deliver a photo nobody asked for, as a straggling callback would
    pub fn push_photo(&self) {
        let (sink, size) = {
            let shared = self.shared.lock().unwrap();
            (shared.sink.clone(), shared.script.photo_size)
        };
        if let Some(sink) = sink {
            sink.photo_ready(Ok(rgba_photo(size)));
        }
    }
}

impl FakeBackend {
    /// Deliver every photo held back by `hold_photos`
    pub fn release_photos(&self) {
        let (sink, held) = {
            let mut shared = self.shared.lock().unwrap();
            (shared.sink.clone(), std::mem::take(&mut shared.held_photos))
        };
        if let Some(sink) = sink {
            for result in held {
                sink.photo_ready(result);
            }
        }
    }
}

pub fn frame(sequence: u64) -> CameraFrame {
    CameraFrame {
        width: 2,
        height: 2,
        data: Arc::from(vec![0u8; 16]),
        format: PixelFormat::RGBA,
        stride: 8,
        rotation: SensorRotation::None,
        sequence,
        captured_at: Instant::now(),
    }
}

fn rgba_photo((width, height): (u32, u32)) -> RawPhoto {
    RawPhoto::Rgba {
        width,
        height,
        data: Arc::from(vec![128u8; (width * height * 4) as usize]),
    }
}

impl CameraBackend for FakeBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn default_device(&self, position: Position) -> Option<CameraDevice> {
        self.devices.iter().find(|d| d.position == position).cloned()
    }

    fn authorization_status(&self) -> Authorization {
        self.shared.lock().unwrap().script.authorization
    }

    fn request_access(&self) -> BoxFuture<'static, bool> {
        let shared = Arc::clone(&self.shared);
        Box::pin(async move {
            let mut shared = shared.lock().unwrap();
            let granted = shared.script.grant_on_request;
            shared.script.authorization = if granted {
                Authorization::Authorized
            } else {
                Authorization::Denied
            };
            granted
        })
    }

    fn open_session(&self, sink: Arc<dyn FrameSink>) -> Box<dyn HardwareSession> {
        let mut shared = self.shared.lock().unwrap();
        shared.sink = Some(Arc::clone(&sink));
        shared.record.sessions_opened += 1;
        Box::new(FakeSession {
            shared: Arc::clone(&self.shared),
            sink,
            bound: None,
        })
    }
}

struct FakeSession {
    shared: Arc<Mutex<Shared>>,
    sink: Arc<dyn FrameSink>,
    bound: Option<CameraDevice>,
}

impl HardwareSession for FakeSession {
    fn begin_configuration(&mut self) {}

    fn commit_configuration(&mut self) {}

    fn create_input(&mut self, device: &CameraDevice) -> BackendResult<DeviceInput> {
        Ok(DeviceInput {
            device: device.clone(),
        })
    }

    fn can_add_input(&self, _input: &DeviceInput) -> bool {
        let shared = self.shared.lock().unwrap();
        !shared.script.reject_input && shared.record.input.is_none()
    }

    fn add_input(&mut self, input: DeviceInput) {
        self.shared.lock().unwrap().record.input = Some(input.device.id.clone());
        self.bound = Some(input.device);
    }

    fn remove_input(&mut self) {
        self.shared.lock().unwrap().record.input = None;
        self.bound = None;
    }

    fn can_add_output(&self, output: OutputKind) -> bool {
        let shared = self.shared.lock().unwrap();
        !shared.script.reject_output && !shared.record.outputs.contains(&output)
    }

    fn add_output(&mut self, output: OutputKind) -> BackendResult<()> {
        let mut shared = self.shared.lock().unwrap();
        if shared.record.outputs.contains(&output) {
            return Err(BackendError::Rejected("output attached twice".to_string()));
        }
        shared.record.outputs.push(output);
        Ok(())
    }

    fn supported_codecs(&self) -> Vec<PhotoCodec> {
        vec![PhotoCodec::Hevc, PhotoCodec::Jpeg]
    }

    fn can_set_preset(&self, preset: CapturePreset) -> bool {
        self.bound.is_some() && preset != CapturePreset::Uhd4K
    }

    fn set_preset(&mut self, preset: CapturePreset) {
        self.shared.lock().unwrap().record.preset = Some(preset);
    }

    fn lock_device(&mut self) -> BackendResult<()> {
        if self.shared.lock().unwrap().script.fail_lock {
            return Err(BackendError::LockFailed("scripted".to_string()));
        }
        Ok(())
    }

    fn unlock_device(&mut self) {}

    fn set_zoom(&mut self, factor: f32) {
        self.shared.lock().unwrap().record.zoom = factor;
    }

    fn set_auto_mode(&mut self, mode: AutoMode) -> BackendResult<()> {
        match mode {
            AutoMode::WhiteBalance => Err(BackendError::Unsupported("white balance".to_string())),
            _ => Ok(()),
        }
    }

    fn start_running(&mut self) {
        self.shared.lock().unwrap().record.running = true;
    }

    fn stop_running(&mut self) {
        self.shared.lock().unwrap().record.running = false;
    }

    fn is_running(&self) -> bool {
        self.shared.lock().unwrap().record.running
    }

    fn capture_photo(&mut self, request: &PhotoRequest) {
        let mut shared = self.shared.lock().unwrap();
        shared.record.photo_requests.push(request.clone());
        let result = if shared.script.fail_photo {
            Err(BackendError::CaptureFailed("scripted".to_string()))
        } else {
            Ok(rgba_photo(shared.script.photo_size))
        };
        if shared.script.hold_photos {
            shared.held_photos.push(result);
            return;
        }
        drop(shared);
        self.sink.photo_ready(result);
    }
}
