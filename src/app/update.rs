// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling

use crate::app::CaptureViewModel;
use crate::app::state::{Message, ViewState};
use crate::errors::{CaptureError, CaptureResult};
use crate::flash::FlashMode;
use crate::session::ControllerState;
use tracing::{debug, info, warn};

impl CaptureViewModel {
    /// Apply one message
    ///
    /// Controller failures are surfaced through [`alert`](Self::alert).
    pub async fn update(&mut self, message: Message) {
        match message {
            // ===== Lifecycle =====
            Message::Appear => self.handle_appear().await,
            Message::Disappear => self.handle_disappear().await,

            // ===== Channel events =====
            Message::PreviewFrame(frame) => {
                if self.state.shows_preview() {
                    self.preview = Some(frame);
                }
            }
            Message::PhotoCaptured(photo) => {
                if self.state == ViewState::Processing {
                    info!(id = %photo.id, "Photo ready for validation");
                    self.photo = Some(photo);
                    self.state = ViewState::Validating;
                } else {
                    debug!(state = ?self.state, "Ignoring photo outside of processing");
                }
            }

            // ===== Capture flow =====
            Message::Capture => self.handle_capture().await,
            Message::Accept => self.handle_accept().await,
            Message::Retake => self.handle_retake().await,

            // ===== Device selection =====
            Message::SwitchPosition => {
                let result = self.controller.change_position().await;
                self.settle(result).await;
            }
            Message::SelectDevice(device) => {
                let result = self.controller.change_device(device).await;
                self.settle(result).await;
            }

            // ===== Settings =====
            Message::SetPreset(preset) => {
                let result = self.controller.change_preset(preset).await;
                self.settle(result).await;
            }
            Message::SetCodec(codec) => {
                let result = self.controller.change_codec(codec).await;
                self.settle(result).await;
            }
            Message::SetFlash(flash) => {
                let result = self.controller.change_flash_mode(flash).await;
                self.settle(result).await;
            }
            Message::CycleFlash => {
                let (current, supported) = match &self.configuration {
                    Some(configuration) => (
                        configuration.flash,
                        configuration.supported_flash_modes().to_vec(),
                    ),
                    None => (FlashMode::default(), vec![FlashMode::Off]),
                };
                let next = current.next_supported(&supported);
                let result = self.controller.change_flash_mode(next).await;
                self.settle(result).await;
            }
            Message::SetRatio(ratio) => {
                let result = self.controller.change_ratio(ratio).await;
                self.settle(result).await;
            }
            Message::SetZoom(factor) => {
                let result = self.controller.change_zoom(factor).await.map(|applied| {
                    debug!(requested = factor, applied, "Zoom applied");
                });
                self.settle(result).await;
            }

            Message::DismissAlert => self.alert = None,
        }
    }

    async fn handle_appear(&mut self) {
        self.state = ViewState::Loading;
        match self.controller.start().await {
            Ok(()) => {
                self.start_consumers().await;
                self.photo = None;
                self.state = ViewState::Previewing;
            }
            Err(CaptureError::CameraUnauthorized) => {
                self.alert = Some(CaptureError::CameraUnauthorized);
                self.state = ViewState::Unauthorized;
            }
            Err(e) => {
                warn!(error = %e, "Failed to start camera");
                self.alert = Some(e);
            }
        }
        self.refresh_configuration().await;
    }

    async fn handle_disappear(&mut self) {
        self.stop_consumers();
        if let Err(e) = self.controller.end().await {
            warn!(error = %e, "Failed to end camera session");
        }
        self.preview = None;
    }

    async fn handle_capture(&mut self) {
        // Processing allows a retry when the previous photo was dropped
        if !matches!(self.state, ViewState::Previewing | ViewState::Processing) {
            debug!(state = ?self.state, "Capture ignored");
            return;
        }
        match self.controller.take_photo().await {
            Ok(()) => self.state = ViewState::Processing,
            Err(e) => {
                warn!(error = %e, "Photo capture request failed");
                self.alert = Some(e);
            }
        }
    }

    async fn handle_accept(&mut self) {
        if self.state != ViewState::Validating {
            return;
        }
        self.stop_consumers();
        if let Err(e) = self.controller.end().await {
            warn!(error = %e, "Failed to end camera session");
        }
        self.preview = None;
        self.state = ViewState::Accepted;
    }

    async fn handle_retake(&mut self) {
        if self.state != ViewState::Validating {
            return;
        }
        self.photo = None;
        match self.controller.resume().await {
            Ok(()) => self.state = ViewState::Previewing,
            Err(e) => self.alert = Some(e),
        }
    }

    /// Record a failure as the alert and refresh the settings snapshot
    ///
    /// A failed reconfiguration that left the controller needing setup
    /// drops back to [`ViewState::Loading`] until the next `Appear`.
    async fn settle(&mut self, result: CaptureResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "Camera operation failed");
            self.alert = Some(e);
            if self.controller.state().await == Ok(ControllerState::NeedsSetup) {
                self.preview = None;
                self.state = ViewState::Loading;
            }
        }
        self.refresh_configuration().await;
    }
}
