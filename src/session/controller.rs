// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle
//!
//! [`CaptureController`] is a cheap handle onto a single tokio task that owns
//! the hardware session, the [`SessionConfiguration`] and the
//! [`FrameBroadcaster`]. Every public operation is a message on one command
//! queue, and hardware callbacks are funnelled into the same queue by
//! [`ControllerSink`], so exactly one mutation is in flight at a time.
//!
//! ```text
//!                 ┌──────────────┐
//!   handle ──────▶│              │──▶ HardwareSession
//!   handle ──────▶│ command loop │
//!   FrameSink ───▶│              │──▶ FrameBroadcaster ──▶ PreviewStream / PhotoStream
//!                 └──────────────┘
//! ```
//!
//! State machine:
//!
//! ```text
//! NeedsSetup ──start──▶ Started ◀──resume/pause──▶ Paused
//!     │                    │                          │
//!     └──denied──▶ Unauthorized         end           │
//!                          ▼                          ▼
//!                        Ended ◀──────────────────────┘
//!                          └────────start──────▶ Started
//! ```

use super::broadcaster::{FrameBroadcaster, PhotoStream, PreviewStream};
use super::configuration::SessionConfiguration;
use super::rotation::{DeviceOrientation, RotationCoordinator};
use super::sink::ControllerSink;
use crate::backends::camera::{
    Authorization, BackendResult, CameraBackend, CameraDevice, CameraFrame, DeviceCatalog,
    HardwareSession, PhotoCodec,
};
use crate::config::Config;
use crate::constants::{CapturePreset, FRAME_LOG_INTERVAL};
use crate::errors::{CaptureError, CaptureResult};
use crate::flash::FlashMode;
use crate::pipelines::photo::{AspectRatio, CapturedPhoto, DecodedPhoto, PhotoMetadata, finish_photo};
use chrono::Local;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

/// Lifecycle state of a [`CaptureController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// No device bound yet
    #[default]
    NeedsSetup,
    /// Hardware running, preview flowing (unless gated by a photo capture)
    Started,
    /// Hardware stopped, resources kept for a quick resume
    Paused,
    /// Hardware stopped and both channels closed
    Ended,
    /// Camera permission denied; a later `start` re-checks
    Unauthorized,
}

type Reply<T> = oneshot::Sender<CaptureResult<T>>;

/// Messages processed by the controller task
pub(crate) enum Command {
    Start(Reply<()>),
    Pause(Reply<()>),
    Resume(Reply<()>),
    End(Reply<()>),
    TakePhoto(Reply<()>),
    ChangeDevice(CameraDevice, Reply<()>),
    ChangePosition(Reply<()>),
    ChangePreset(CapturePreset, Reply<()>),
    ChangeCodec(PhotoCodec, Reply<()>),
    ChangeFlashMode(FlashMode, Reply<()>),
    ChangeZoom(f32, Reply<f32>),
    ChangeRatio(AspectRatio, Reply<()>),
    SetOrientation(DeviceOrientation, Reply<()>),
    SetWarmupFrames(u32, Reply<()>),
    State(Reply<ControllerState>),
    Configuration(Reply<SessionConfiguration>),
    LastPhoto(Reply<Option<Arc<CapturedPhoto>>>),
    PreviewStream(Reply<Option<PreviewStream>>),
    PhotoStream(Reply<Option<PhotoStream>>),
    IsRunning(Reply<bool>),
    /// Photo-ready callback, already decoded on the hardware thread
    PhotoDelivered(BackendResult<DecodedPhoto>),
    /// Frame-ready callback
    FrameDelivered(CameraFrame),
}

/// Handle onto the capture controller task
///
/// Clones share the same controller. The task exits once every handle is
/// dropped, stopping the hardware session. If the task is gone, every call
/// fails with [`CaptureError::CameraUnavailable`].
#[derive(Clone)]
pub struct CaptureController {
    commands: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl CaptureController {
    /// Spawn a controller task on the current tokio runtime
    ///
    /// The hardware session is opened lazily on the first successful `start`.
    pub fn new(backend: Arc<dyn CameraBackend>, config: &Config) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let actor = ControllerActor::new(backend, config, commands.downgrade());
        tokio::spawn(actor.run(receiver));
        Self { commands }
    }

    async fn call<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> CaptureResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| CaptureError::CameraUnavailable)?;
        response.await.map_err(|_| CaptureError::CameraUnavailable)?
    }

    /// Authorize, bind a device on first use and start the hardware
    ///
    /// Fails with [`CaptureError::CannotStartCamera`] if the hardware is
    /// already running.
    pub async fn start(&self) -> CaptureResult<()> {
        self.call(Command::Start).await
    }

    /// Stop the hardware and gate preview, keeping the device bound
    pub async fn pause(&self) -> CaptureResult<()> {
        self.call(Command::Pause).await
    }

    /// Restart the hardware and ungate preview
    pub async fn resume(&self) -> CaptureResult<()> {
        self.call(Command::Resume).await
    }

    /// Stop the hardware and close both channels
    pub async fn end(&self) -> CaptureResult<()> {
        self.call(Command::End).await
    }

    /// Gate preview and submit a photo request
    ///
    /// Returns once the request is submitted; the photo arrives later on the
    /// photo stream. Preview stays gated until [`resume`](Self::resume).
    pub async fn take_photo(&self) -> CaptureResult<()> {
        self.call(Command::TakePhoto).await
    }

    /// Rebind to `device`
    ///
    /// On failure the controller is left without a device in
    /// [`ControllerState::NeedsSetup`]; call [`start`](Self::start) to recover.
    pub async fn change_device(&self, device: CameraDevice) -> CaptureResult<()> {
        self.call(|reply| Command::ChangeDevice(device, reply)).await
    }

    /// Switch between front and back, binding the best device there
    pub async fn change_position(&self) -> CaptureResult<()> {
        self.call(Command::ChangePosition).await
    }

    pub async fn change_preset(&self, preset: CapturePreset) -> CaptureResult<()> {
        self.call(|reply| Command::ChangePreset(preset, reply)).await
    }

    pub async fn change_codec(&self, codec: PhotoCodec) -> CaptureResult<()> {
        self.call(|reply| Command::ChangeCodec(codec, reply)).await
    }

    pub async fn change_flash_mode(&self, flash: FlashMode) -> CaptureResult<()> {
        self.call(|reply| Command::ChangeFlashMode(flash, reply)).await
    }

    /// Apply a zoom factor, returning the clamped value actually applied
    pub async fn change_zoom(&self, factor: f32) -> CaptureResult<f32> {
        self.call(|reply| Command::ChangeZoom(factor, reply)).await
    }

    pub async fn change_ratio(&self, ratio: AspectRatio) -> CaptureResult<()> {
        self.call(|reply| Command::ChangeRatio(ratio, reply)).await
    }

    /// Report the host device orientation used for frame and photo rotation
    pub async fn set_device_orientation(&self, orientation: DeviceOrientation) -> CaptureResult<()> {
        self.call(|reply| Command::SetOrientation(orientation, reply))
            .await
    }

    /// Change the preview warm-up skip count
    pub async fn set_warmup_frames(&self, frames: u32) -> CaptureResult<()> {
        self.call(|reply| Command::SetWarmupFrames(frames, reply))
            .await
    }

    pub async fn state(&self) -> CaptureResult<ControllerState> {
        self.call(Command::State).await
    }

    /// Snapshot of the current configuration
    pub async fn configuration(&self) -> CaptureResult<SessionConfiguration> {
        self.call(Command::Configuration).await
    }

    /// Most recently delivered photo
    pub async fn last_photo(&self) -> CaptureResult<Option<Arc<CapturedPhoto>>> {
        self.call(Command::LastPhoto).await
    }

    /// Take the preview stream of the current start cycle
    ///
    /// `None` before the first `start` and once this cycle's stream has
    /// been taken.
    pub async fn preview_stream(&self) -> CaptureResult<Option<PreviewStream>> {
        self.call(Command::PreviewStream).await
    }

    /// Take the photo stream of the current start cycle
    pub async fn photo_stream(&self) -> CaptureResult<Option<PhotoStream>> {
        self.call(Command::PhotoStream).await
    }

    /// Whether the hardware session reports running
    pub async fn is_running(&self) -> CaptureResult<bool> {
        self.call(Command::IsRunning).await
    }
}

/// Settings snapshotted when a photo is requested
struct PendingPhoto {
    generation: u64,
    ratio: AspectRatio,
    metadata: PhotoMetadata,
}

/// State owned by the controller task
struct ControllerActor {
    backend: Arc<dyn CameraBackend>,
    catalog: DeviceCatalog,
    sink_commands: mpsc::WeakUnboundedSender<Command>,
    session: Option<Box<dyn HardwareSession>>,
    configuration: SessionConfiguration,
    rotation: RotationCoordinator,
    broadcaster: Option<FrameBroadcaster>,
    generation: u64,
    state: ControllerState,
    /// Device chosen before the first successful setup
    requested_device: Option<CameraDevice>,
    pending_photos: VecDeque<PendingPhoto>,
    last_photo: Option<Arc<CapturedPhoto>>,
    warmup_frames: u32,
    preview_capacity: usize,
    frames_received: u64,
}

impl ControllerActor {
    fn new(
        backend: Arc<dyn CameraBackend>,
        config: &Config,
        sink_commands: mpsc::WeakUnboundedSender<Command>,
    ) -> Self {
        let catalog = DeviceCatalog::new(Arc::clone(&backend));
        let mut configuration = SessionConfiguration::from_config(config);
        configuration.refresh_devices(&catalog);

        Self {
            backend,
            catalog,
            sink_commands,
            session: None,
            configuration,
            rotation: RotationCoordinator::default(),
            broadcaster: None,
            generation: 0,
            state: ControllerState::NeedsSetup,
            requested_device: None,
            pending_photos: VecDeque::new(),
            last_photo: None,
            warmup_frames: config.warmup_frames,
            preview_capacity: config.preview_capacity,
            frames_received: 0,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Capture controller task started");
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        if let Some(session) = self.session.as_mut() {
            session.stop_running();
        }
        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.finish();
        }
        debug!("Capture controller task exited");
    }

    async fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Start(reply) => {
                let _ = reply.send(self.start().await);
            }
            Command::Pause(reply) => {
                let _ = reply.send(self.pause());
            }
            Command::Resume(reply) => {
                let _ = reply.send(self.resume());
            }
            Command::End(reply) => {
                let _ = reply.send(self.end());
            }
            Command::TakePhoto(reply) => {
                let _ = reply.send(self.take_photo());
            }
            Command::ChangeDevice(device, reply) => {
                let _ = reply.send(self.change_device(device));
            }
            Command::ChangePosition(reply) => {
                let _ = reply.send(self.change_position());
            }
            Command::ChangePreset(preset, reply) => {
                self.change_preset(preset);
                let _ = reply.send(Ok(()));
            }
            Command::ChangeCodec(codec, reply) => {
                debug!(?codec, "Codec changed");
                self.configuration.codec = codec;
                let _ = reply.send(Ok(()));
            }
            Command::ChangeFlashMode(flash, reply) => {
                if !self.configuration.supported_flash_modes().contains(&flash) {
                    debug!(?flash, "Flash mode not supported by the bound device, photos use Off");
                }
                self.configuration.flash = flash;
                let _ = reply.send(Ok(()));
            }
            Command::ChangeZoom(factor, reply) => {
                let _ = reply.send(self.change_zoom(factor));
            }
            Command::ChangeRatio(ratio, reply) => {
                debug!(%ratio, "Aspect ratio changed");
                self.configuration.aspect_ratio = ratio;
                let _ = reply.send(Ok(()));
            }
            Command::SetOrientation(orientation, reply) => {
                self.rotation.set_orientation(orientation);
                debug!(?orientation, rotation = %self.rotation.rotation(), "Device orientation changed");
                let _ = reply.send(Ok(()));
            }
            Command::SetWarmupFrames(frames, reply) => {
                self.warmup_frames = frames;
                if let Some(broadcaster) = self.broadcaster.as_mut() {
                    broadcaster.set_warmup_frames(frames);
                }
                let _ = reply.send(Ok(()));
            }
            Command::State(reply) => {
                let _ = reply.send(Ok(self.state));
            }
            Command::Configuration(reply) => {
                let _ = reply.send(Ok(self.configuration.clone()));
            }
            Command::LastPhoto(reply) => {
                let _ = reply.send(Ok(self.last_photo.clone()));
            }
            Command::PreviewStream(reply) => {
                let stream = self
                    .broadcaster
                    .as_mut()
                    .and_then(FrameBroadcaster::take_preview_stream);
                let _ = reply.send(Ok(stream));
            }
            Command::PhotoStream(reply) => {
                let stream = self
                    .broadcaster
                    .as_mut()
                    .and_then(FrameBroadcaster::take_photo_stream);
                let _ = reply.send(Ok(stream));
            }
            Command::IsRunning(reply) => {
                let _ = reply.send(Ok(self.is_running()));
            }
            Command::PhotoDelivered(result) => self.photo_delivered(result),
            Command::FrameDelivered(frame) => self.frame_delivered(frame),
        }
    }

    fn transition(&mut self, to: ControllerState) {
        if self.state != to {
            info!(from = ?self.state, to = ?to, "Capture controller state changed");
            self.state = to;
        }
    }

    fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_running())
    }

    // ===== Lifecycle =====

    async fn start(&mut self) -> CaptureResult<()> {
        if self.is_running() {
            warn!(state = ?self.state, "Start requested while the camera is running");
            return Err(CaptureError::CannotStartCamera);
        }

        self.authorize().await?;

        if self.configuration.device.is_none() {
            if let Err(e) = self.setup() {
                self.transition(ControllerState::NeedsSetup);
                return Err(e);
            }
        }

        let generation = self.generation;
        let broadcaster = match self.broadcaster.take() {
            Some(existing) if !existing.is_finished() => existing,
            _ => {
                let generation = generation + 1;
                self.frames_received = 0;
                FrameBroadcaster::new(generation, self.preview_capacity, self.warmup_frames)
            }
        };
        self.generation = broadcaster.generation();
        let broadcaster = self.broadcaster.insert(broadcaster);
        broadcaster.resume();

        if let Some(session) = self.session.as_mut() {
            session.start_running();
        }
        self.transition(ControllerState::Started);
        Ok(())
    }

    async fn authorize(&mut self) -> CaptureResult<()> {
        let granted = match self.backend.authorization_status() {
            Authorization::Authorized => true,
            Authorization::NotDetermined => {
                info!("Requesting camera access");
                self.backend.request_access().await
            }
            Authorization::Denied | Authorization::Restricted => false,
        };

        if granted {
            if self.state == ControllerState::Unauthorized {
                self.transition(ControllerState::NeedsSetup);
            }
            Ok(())
        } else {
            warn!("Camera access not authorized");
            self.transition(ControllerState::Unauthorized);
            Err(CaptureError::CameraUnauthorized)
        }
    }

    /// Open the hardware session if needed and bind the initial device
    fn setup(&mut self) -> CaptureResult<()> {
        let device = match self.requested_device.clone() {
            Some(device) => device,
            None => self
                .catalog
                .preferred_device(self.configuration.position)
                .ok_or_else(|| {
                    warn!(position = %self.configuration.position, "No camera available");
                    CaptureError::CameraUnavailable
                })?,
        };

        let session = self.session.get_or_insert_with(|| {
            let sink = Arc::new(ControllerSink::new(self.sink_commands.clone()));
            self.backend.open_session(sink)
        });
        self.configuration
            .bind(device.clone(), session.as_mut(), &self.catalog)?;

        self.rotation.bind(&device);
        self.requested_device = None;
        info!(device = %device, "Capture session configured");
        Ok(())
    }

    fn pause(&mut self) -> CaptureResult<()> {
        if self.state != ControllerState::Started {
            debug!(state = ?self.state, "Pause ignored");
            return Ok(());
        }
        if let Some(session) = self.session.as_mut() {
            session.stop_running();
        }
        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.pause();
        }
        self.transition(ControllerState::Paused);
        Ok(())
    }

    fn resume(&mut self) -> CaptureResult<()> {
        if !matches!(self.state, ControllerState::Started | ControllerState::Paused) {
            debug!(state = ?self.state, "Resume ignored");
            return Ok(());
        }
        if let Some(session) = self.session.as_mut() {
            if !session.is_running() {
                session.start_running();
            }
        }
        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.resume();
        }
        self.transition(ControllerState::Started);
        Ok(())
    }

    fn end(&mut self) -> CaptureResult<()> {
        if !matches!(self.state, ControllerState::Started | ControllerState::Paused) {
            debug!(state = ?self.state, "End ignored");
            return Ok(());
        }
        self.pause()?;
        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.finish();
        }
        self.transition(ControllerState::Ended);
        Ok(())
    }

    // ===== Capture =====

    fn take_photo(&mut self) -> CaptureResult<()> {
        if self.state != ControllerState::Started {
            warn!(state = ?self.state, "Photo requested while the camera is not started");
            return Err(CaptureError::CameraUnavailable);
        }
        let (Some(session), Some(broadcaster)) = (self.session.as_mut(), self.broadcaster.as_mut())
        else {
            return Err(CaptureError::CameraUnavailable);
        };

        // No preview frame may reach the consumer between request and delivery
        broadcaster.pause();

        let request = self.configuration.build_photo_request(session.as_ref());
        let device = self.configuration.device.as_ref();
        self.pending_photos.push_back(PendingPhoto {
            generation: broadcaster.generation(),
            ratio: self.configuration.aspect_ratio,
            metadata: PhotoMetadata {
                captured_at: Local::now(),
                device_id: device.map(|d| d.id.clone()),
                device_name: device.map(|d| d.name.clone()),
                codec: request.codec,
                flash: request.flash,
                orientation: self.rotation.rotation(),
                ..PhotoMetadata::default()
            },
        });

        info!(codec = ?request.codec, flash = ?request.flash, "Submitting photo request");
        session.capture_photo(&request);
        Ok(())
    }

    fn photo_delivered(&mut self, result: BackendResult<DecodedPhoto>) {
        let pending = self.pending_photos.pop_front();

        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "Photo capture failed, dropping");
                return;
            }
        };
        let Some(pending) = pending else {
            warn!("Photo delivered without a pending request, dropping");
            return;
        };
        let Some(broadcaster) = self
            .broadcaster
            .as_mut()
            .filter(|b| !b.is_finished() && b.generation() == pending.generation)
        else {
            debug!(generation = pending.generation, "Photo arrived after its channel closed, ignoring");
            return;
        };

        let photo = Arc::new(finish_photo(decoded, pending.ratio, pending.metadata));
        info!(
            id = %photo.id,
            width = photo.width(),
            height = photo.height(),
            crop = ?photo.metadata.crop,
            "Photo captured"
        );
        self.last_photo = Some(Arc::clone(&photo));
        broadcaster.emit_photo(photo);
    }

    fn frame_delivered(&mut self, mut frame: CameraFrame) {
        let Some(broadcaster) = self.broadcaster.as_mut() else {
            return;
        };
        frame.rotation = self.rotation.rotation();
        let sequence = frame.sequence;
        let queued = broadcaster.emit_preview(Arc::new(frame));
        trace!(sequence, queued, "Preview frame");

        self.frames_received += 1;
        if self.frames_received % FRAME_LOG_INTERVAL == 0 {
            let (emitted, dropped) = broadcaster.frame_counts();
            debug!(
                received = self.frames_received,
                emitted,
                dropped,
                paused = broadcaster.is_paused(),
                "Preview statistics"
            );
        }
    }

    // ===== Reconfiguration =====

    fn change_device(&mut self, device: CameraDevice) -> CaptureResult<()> {
        let bound = !matches!(
            self.state,
            ControllerState::NeedsSetup | ControllerState::Unauthorized
        );
        let Some(session) = self.session.as_mut().filter(|_| bound) else {
            debug!(device = %device, "Device recorded for the next setup");
            self.configuration.position = device.position;
            self.configuration.refresh_devices(&self.catalog);
            self.requested_device = Some(device);
            return Ok(());
        };

        let restart = matches!(self.state, ControllerState::Started | ControllerState::Paused);
        session.stop_running();
        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.pause();
        }
        self.configuration.unbind(session.as_mut());

        if let Err(e) = self
            .configuration
            .bind(device.clone(), session.as_mut(), &self.catalog)
        {
            warn!(device = %device, error = %e, "Device switch failed, setup required");
            self.configuration.refresh_devices(&self.catalog);
            self.transition(ControllerState::NeedsSetup);
            return Err(e);
        }
        self.rotation.bind(&device);
        info!(device = %device, "Switched capture device");

        if let Some(broadcaster) = self.broadcaster.as_mut() {
            broadcaster.rearm_warmup();
            // A photo in flight keeps preview gated until an explicit resume
            let in_flight = self
                .pending_photos
                .iter()
                .any(|pending| pending.generation == broadcaster.generation());
            if restart && !in_flight {
                broadcaster.resume();
            }
        }
        if restart {
            session.start_running();
            self.transition(ControllerState::Started);
        }
        Ok(())
    }

    fn change_position(&mut self) -> CaptureResult<()> {
        let target = self.configuration.position.toggled();
        let Some(device) = self.catalog.preferred_device(target) else {
            warn!(position = %target, "No camera available for position");
            return Err(CaptureError::CameraUnavailable);
        };
        self.configuration.switch_position(&self.catalog);
        self.change_device(device)
    }

    fn change_preset(&mut self, preset: CapturePreset) {
        debug!(%preset, "Preset changed");
        match self.session.as_mut() {
            Some(session) => self.configuration.set_preset(preset, Some(session.as_mut())),
            None => self.configuration.set_preset(preset, None),
        }
    }

    fn change_zoom(&mut self, factor: f32) -> CaptureResult<f32> {
        let Some(session) = self.session.as_mut() else {
            return Err(CaptureError::ZoomUpdateFailed);
        };
        self.configuration.set_zoom(factor, session.as_mut())
    }
}
