// SPDX-License-Identifier: GPL-3.0-only

//! Tunable capture parameters and device binding

use crate::backends::camera::{
    AutoMode, CameraDevice, DeviceCatalog, HardwareSession, OutputKind, PhotoCodec, PhotoRequest,
    Position,
};
use crate::config::Config;
use crate::constants::{CapturePreset, MAX_ZOOM_FACTOR, MIN_ZOOM_FACTOR, QualityPrioritization};
use crate::errors::{CaptureError, CaptureResult};
use crate::flash::FlashMode;
use crate::pipelines::photo::AspectRatio;
use tracing::{debug, info, warn};

/// Every capture setting plus the capability lists derived from the bound device
///
/// Snapshots handed to callers are plain clones; the live value is only
/// mutated inside the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfiguration {
    /// Bound device, `None` until the first successful bind
    pub device: Option<CameraDevice>,
    pub position: Position,
    pub preset: CapturePreset,
    pub codec: PhotoCodec,
    pub flash: FlashMode,
    /// Applied zoom factor
    pub zoom: f32,
    pub aspect_ratio: AspectRatio,
    pub prioritization: QualityPrioritization,

    available_devices: Vec<CameraDevice>,
    supported_codecs: Vec<PhotoCodec>,
    supported_flash_modes: Vec<FlashMode>,
    supported_presets: Vec<CapturePreset>,
    max_zoom: f32,
    attached_outputs: Vec<OutputKind>,
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SessionConfiguration {
    /// Seed from persisted preferences
    pub fn from_config(config: &Config) -> Self {
        Self {
            device: None,
            position: config.position,
            preset: config.preset,
            codec: config.codec,
            flash: config.flash,
            zoom: MIN_ZOOM_FACTOR,
            aspect_ratio: config.aspect_ratio,
            prioritization: config.prioritization,
            available_devices: Vec::new(),
            supported_codecs: Vec::new(),
            supported_flash_modes: vec![FlashMode::Off],
            supported_presets: Vec::new(),
            max_zoom: MIN_ZOOM_FACTOR,
            attached_outputs: Vec::new(),
        }
    }

    // ===== Derived lists =====

    /// Devices for the current position, best first
    pub fn available_devices(&self) -> &[CameraDevice] {
        &self.available_devices
    }

    pub fn supported_codecs(&self) -> &[PhotoCodec] {
        &self.supported_codecs
    }

    pub fn supported_flash_modes(&self) -> &[FlashMode] {
        &self.supported_flash_modes
    }

    pub fn supported_presets(&self) -> &[CapturePreset] {
        &self.supported_presets
    }

    /// Upper zoom bound: the device maximum capped at [`MAX_ZOOM_FACTOR`]
    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Highest-priority device for the current position
    pub fn preferred_device(&self) -> Option<&CameraDevice> {
        self.available_devices.first()
    }

    pub fn refresh_devices(&mut self, catalog: &DeviceCatalog) {
        self.available_devices = catalog.devices(self.position);
    }

    // ===== Binding =====

    /// Attach `device` and the photo/frame outputs to `session`
    ///
    /// Runs inside one configuration transaction. On success the derived
    /// lists are refreshed and default auto modes are applied. Outputs are
    /// only attached once per session.
    pub fn bind(
        &mut self,
        device: CameraDevice,
        session: &mut dyn HardwareSession,
        catalog: &DeviceCatalog,
    ) -> CaptureResult<()> {
        info!(device = %device, "Binding capture device");

        session.begin_configuration();
        let attached = self.attach(&device, session);
        if attached.is_ok() {
            if session.can_set_preset(self.preset) {
                session.set_preset(self.preset);
            } else {
                debug!(preset = %self.preset, "Preset not settable on this device");
            }
        }
        session.commit_configuration();
        attached?;

        self.zoom = MIN_ZOOM_FACTOR;
        self.refresh_capabilities(&device, session, catalog);
        Self::apply_auto_modes(session);
        Ok(())
    }

    fn attach(&mut self, device: &CameraDevice, session: &mut dyn HardwareSession) -> CaptureResult<()> {
        let input = session.create_input(device).map_err(|e| {
            warn!(device = %device.name, error = %e, "Failed to create device input");
            CaptureError::DeviceCreationFailed
        })?;
        if !session.can_add_input(&input) {
            warn!(device = %device.name, "Session rejected device input");
            return Err(CaptureError::CannotAddInput);
        }
        session.add_input(input);

        if let Err(e) = self.attach_outputs(session) {
            // Leave the session without a half-configured input
            session.remove_input();
            return Err(e);
        }
        self.device = Some(device.clone());
        self.position = device.position;
        Ok(())
    }

    fn attach_outputs(&mut self, session: &mut dyn HardwareSession) -> CaptureResult<()> {
        let missing: Vec<OutputKind> = [OutputKind::Photo, OutputKind::Frames]
            .into_iter()
            .filter(|output| !self.attached_outputs.contains(output))
            .collect();
        if missing.iter().any(|output| !session.can_add_output(*output)) {
            warn!(?missing, "Session rejected outputs");
            return Err(CaptureError::CannotAddOutput);
        }
        for output in missing {
            session.add_output(output).map_err(|e| {
                warn!(?output, error = %e, "Failed to add output");
                CaptureError::CannotAddOutput
            })?;
            self.attached_outputs.push(output);
        }
        Ok(())
    }

    fn refresh_capabilities(
        &mut self,
        device: &CameraDevice,
        session: &dyn HardwareSession,
        catalog: &DeviceCatalog,
    ) {
        self.supported_codecs = session.supported_codecs();
        self.supported_presets = CapturePreset::ALL
            .into_iter()
            .filter(|preset| session.can_set_preset(*preset))
            .collect();
        self.supported_flash_modes = if device.has_flash {
            FlashMode::ALL.to_vec()
        } else {
            vec![FlashMode::Off]
        };
        self.max_zoom = device.max_zoom.min(MAX_ZOOM_FACTOR).max(MIN_ZOOM_FACTOR);
        self.available_devices = catalog.devices(self.position);

        debug!(
            codecs = ?self.supported_codecs,
            presets = self.supported_presets.len(),
            max_zoom = self.max_zoom,
            devices = self.available_devices.len(),
            "Refreshed device capabilities"
        );
    }

    /// Best-effort continuous focus, exposure and white balance
    fn apply_auto_modes(session: &mut dyn HardwareSession) {
        if let Err(e) = session.lock_device() {
            debug!(error = %e, "Skipping auto modes, device lock unavailable");
            return;
        }
        for mode in AutoMode::ALL {
            if let Err(e) = session.set_auto_mode(mode) {
                debug!(?mode, error = %e, "Auto mode not applied");
            }
        }
        session.unlock_device();
    }

    /// Detach the bound device input, if any
    ///
    /// Derived capabilities fall back to their unbound values so no stale
    /// device limits outlive the input.
    pub fn unbind(&mut self, session: &mut dyn HardwareSession) {
        if self.device.take().is_some() {
            session.begin_configuration();
            session.remove_input();
            session.commit_configuration();
        }
        self.clear_capabilities();
    }

    fn clear_capabilities(&mut self) {
        self.supported_codecs.clear();
        self.supported_presets.clear();
        self.supported_flash_modes = vec![FlashMode::Off];
        self.max_zoom = MIN_ZOOM_FACTOR;
        self.zoom = MIN_ZOOM_FACTOR;
    }

    /// Toggle front/back and refresh the device list for the new position
    ///
    /// Does not rebind; the caller binds a device from
    /// [`available_devices`](Self::available_devices).
    pub fn switch_position(&mut self, catalog: &DeviceCatalog) {
        self.position = self.position.toggled();
        self.refresh_devices(catalog);
    }

    // ===== Capture =====

    /// Build a photo request from the current settings
    ///
    /// Codec support is only known after binding, so the configured codec
    /// falls back to the output's first supported one.
    pub fn build_photo_request(&self, session: &dyn HardwareSession) -> PhotoRequest {
        let supported = session.supported_codecs();
        let codec = if supported.contains(&self.codec) {
            self.codec
        } else {
            supported.first().copied().unwrap_or(self.codec)
        };
        if codec != self.codec {
            debug!(requested = ?self.codec, used = ?codec, "Codec not supported, falling back");
        }

        let flash = if self.supported_flash_modes.contains(&self.flash) {
            self.flash
        } else {
            FlashMode::Off
        };

        PhotoRequest {
            codec,
            flash,
            prioritization: self.prioritization,
            preset: self.preset,
        }
    }

    // ===== Setting changes =====

    /// Clamp a requested zoom into `[1.0, max_zoom]`
    pub fn clamp_zoom(&self, factor: f32) -> f32 {
        if factor.is_nan() {
            return MIN_ZOOM_FACTOR;
        }
        factor.min(self.max_zoom).max(MIN_ZOOM_FACTOR)
    }

    /// Apply a clamped zoom factor under the device lock
    pub fn set_zoom(&mut self, factor: f32, session: &mut dyn HardwareSession) -> CaptureResult<f32> {
        if self.device.is_none() {
            warn!("Zoom requested without a bound device");
            return Err(CaptureError::ZoomUpdateFailed);
        }
        let applied = self.clamp_zoom(factor);
        session.lock_device().map_err(|e| {
            warn!(error = %e, "Cannot lock device for zoom");
            CaptureError::ZoomUpdateFailed
        })?;
        session.set_zoom(applied);
        session.unlock_device();
        self.zoom = applied;
        debug!(requested = factor, applied, "Zoom updated");
        Ok(applied)
    }

    /// Record a preset and apply it to the bound session when settable
    pub fn set_preset(&mut self, preset: CapturePreset, session: Option<&mut dyn HardwareSession>) {
        self.preset = preset;
        let Some(session) = session else {
            return;
        };
        if self.device.is_none() {
            return;
        }
        if session.can_set_preset(preset) {
            session.begin_configuration();
            session.set_preset(preset);
            session.commit_configuration();
        } else {
            warn!(%preset, "Preset not supported by the bound device");
        }
    }
}
