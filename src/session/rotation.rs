// SPDX-License-Identifier: GPL-3.0-only

//! Rotation metadata for preview frames and photos

use crate::backends::camera::types::{CameraDevice, Position, SensorRotation};

/// Physical orientation of the host device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceOrientation {
    /// Upright, natural orientation (default)
    #[default]
    Portrait,
    /// Rotated 90° counter-clockwise (home button / bottom edge on the right)
    LandscapeLeft,
    PortraitUpsideDown,
    /// Rotated 90° clockwise
    LandscapeRight,
}

impl DeviceOrientation {
    /// Clockwise rotation that undoes this device orientation for a back camera
    fn compensation(&self) -> SensorRotation {
        match self {
            DeviceOrientation::Portrait => SensorRotation::None,
            DeviceOrientation::LandscapeLeft => SensorRotation::Rotate270,
            DeviceOrientation::PortraitUpsideDown => SensorRotation::Rotate180,
            DeviceOrientation::LandscapeRight => SensorRotation::Rotate90,
        }
    }
}

/// Combines the bound device's sensor mounting with the device orientation
#[derive(Debug, Clone, Default)]
pub struct RotationCoordinator {
    sensor: SensorRotation,
    position: Position,
    orientation: DeviceOrientation,
}

impl RotationCoordinator {
    /// Track a newly bound device
    pub fn bind(&mut self, device: &CameraDevice) {
        self.sensor = device.rotation;
        self.position = device.position;
    }

    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        self.orientation = orientation;
    }

    pub fn orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    /// Clockwise rotation a consumer applies to show a frame upright
    pub fn rotation(&self) -> SensorRotation {
        let compensation = self.orientation.compensation();
        // Front cameras are mirrored, so landscape compensation runs the other way
        let compensation = match self.position {
            Position::Back => compensation,
            Position::Front => {
                SensorRotation::from_degrees_int(-(compensation.degrees() as i32))
            }
        };
        self.sensor.then(compensation)
    }
}
