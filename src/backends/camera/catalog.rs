// SPDX-License-Identifier: GPL-3.0-only

//! Device discovery ranked by lens capability

use super::CameraBackend;
use super::types::{CameraDevice, Position};
use std::sync::Arc;
use tracing::debug;

/// Ranked view over a backend's device registry
#[derive(Clone)]
pub struct DeviceCatalog {
    backend: Arc<dyn CameraBackend>,
}

impl DeviceCatalog {
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self { backend }
    }

    /// Devices facing `position`, best first
    ///
    /// An empty list means the caller should fall back to the platform
    /// default device.
    pub fn devices(&self, position: Position) -> Vec<CameraDevice> {
        let devices = rank(self.backend.enumerate_cameras(), position);
        debug!(%position, count = devices.len(), "Enumerated capture devices");
        devices
    }

    /// Highest-priority device for `position`, or the platform default
    pub fn preferred_device(&self, position: Position) -> Option<CameraDevice> {
        self.devices(position)
            .into_iter()
            .next()
            .or_else(|| self.backend.default_device(position))
    }
}

impl std::fmt::Debug for DeviceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCatalog").finish_non_exhaustive()
    }
}

/// Filter to `position` and sort by lens priority.
///
/// The sort is stable so devices of equal rank keep registry order.
pub fn rank(devices: Vec<CameraDevice>, position: Position) -> Vec<CameraDevice> {
    let mut matching: Vec<CameraDevice> = devices
        .into_iter()
        .filter(|device| device.position == position)
        .collect();
    matching.sort_by_key(|device| device.lens.priority());
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{LensType, SensorRotation};

    fn device(id: &str, position: Position, lens: LensType) -> CameraDevice {
        CameraDevice {
            id: id.to_string(),
            name: id.to_string(),
            position,
            lens,
            rotation: SensorRotation::None,
            min_zoom: 1.0,
            max_zoom: 4.0,
            has_flash: false,
        }
    }

    #[test]
    fn test_rank_prefers_multi_lens() {
        let devices = vec![
            device("tele", Position::Back, LensType::Telephoto),
            device("wide", Position::Back, LensType::WideAngle),
            device("front", Position::Front, LensType::TrueDepth),
            device("triple", Position::Back, LensType::Triple),
            device("dual", Position::Back, LensType::Dual),
        ];

        let ids: Vec<String> = rank(devices, Position::Back)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["triple", "dual", "wide", "tele"]);
    }

    #[test]
    fn test_rank_empty_for_missing_position() {
        let devices = vec![device("wide", Position::Back, LensType::WideAngle)];
        assert!(rank(devices, Position::Front).is_empty());
    }

    #[test]
    fn test_rank_is_stable_for_equal_priority() {
        let devices = vec![
            device("depth", Position::Front, LensType::Depth),
            device("truedepth", Position::Front, LensType::TrueDepth),
        ];
        let ids: Vec<String> = rank(devices, Position::Front)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["depth", "truedepth"]);
    }
}
