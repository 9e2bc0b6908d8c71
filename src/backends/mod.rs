// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! # Modules
//!
//! - [`camera`]: Capability traits every camera platform implements, the
//!   shared value types, and device ranking
//! - [`virtual_camera`]: Software backend producing synthetic frames and photos

pub mod camera;
pub mod virtual_camera;
