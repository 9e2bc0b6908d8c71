// SPDX-License-Identifier: MPL-2.0

//! Camera Capture - capture session core for a camera screen
//!
//! This library sequences hardware configuration, session start/stop, device
//! switching and still-photo capture, and distributes preview frames and
//! captured photos to a single consumer per channel.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Hardware capability traits, device catalog and the virtual camera
//! - [`session`]: The [`CaptureController`] state machine, configuration and channels
//! - [`pipelines`]: Photo decoding and aspect-ratio cropping
//! - [`app`]: The [`CaptureViewModel`] presentation state machine
//! - [`config`]: Persisted user preferences
//!
//! # Example
//!
//! ```no_run
//! use camera_capture::backends::virtual_camera::VirtualBackend;
//! use camera_capture::{CaptureController, Config};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), camera_capture::CaptureError> {
//! let controller = CaptureController::new(Arc::new(VirtualBackend::new()), &Config::default());
//! controller.start().await?;
//! controller.take_photo().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod pipelines;
pub mod session;

// Re-export commonly used types
pub use app::{CaptureViewModel, Message, ViewState};
pub use config::Config;
pub use constants::{CapturePreset, QualityPrioritization};
pub use errors::{CaptureError, CaptureResult};
pub use flash::FlashMode;
pub use pipelines::photo::{AspectRatio, CapturedPhoto};
pub use session::{CaptureController, ControllerState, DeviceOrientation, SessionConfiguration};
