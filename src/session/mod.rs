// SPDX-License-Identifier: GPL-3.0-only

//! Capture session core
//!
//! - [`controller`]: The [`CaptureController`] state machine and its task
//! - [`configuration`]: Capture settings and device binding
//! - [`broadcaster`]: Preview and photo channels
//! - [`rotation`]: Display rotation for frames and photos

pub mod broadcaster;
pub mod configuration;
pub mod controller;
pub mod rotation;
mod sink;

pub use broadcaster::{FrameBroadcaster, PhotoStream, PreviewFrame, PreviewStream};
pub use configuration::SessionConfiguration;
pub use controller::{CaptureController, ControllerState};
pub use rotation::{DeviceOrientation, RotationCoordinator};
