// SPDX-License-Identifier: GPL-3.0-only

//! Still-photo flash modes

use serde::{Deserialize, Serialize};

/// Flash operating mode for a photo capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlashMode {
    /// Flash never fires
    #[default]
    Off,
    /// Flash fires for every capture
    On,
    /// The hardware decides from scene brightness
    Auto,
}

impl FlashMode {
    pub const ALL: [FlashMode; 3] = [FlashMode::Off, FlashMode::On, FlashMode::Auto];

    /// Cycle to the next mode: Off -> On -> Auto -> Off
    pub fn next(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Auto,
            FlashMode::Auto => FlashMode::Off,
        }
    }

    /// Cycle through only the modes in `supported`, starting after `self`.
    ///
    /// Returns `self` when nothing else is supported.
    pub fn next_supported(self, supported: &[FlashMode]) -> Self {
        let mut mode = self.next();
        while mode != self {
            if supported.contains(&mode) {
                return mode;
            }
            mode = mode.next();
        }
        self
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FlashMode::Off => "Off",
            FlashMode::On => "On",
            FlashMode::Auto => "Auto",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(FlashMode::Off.next(), FlashMode::On);
        assert_eq!(FlashMode::On.next(), FlashMode::Auto);
        assert_eq!(FlashMode::Auto.next(), FlashMode::Off);
    }

    #[test]
    fn test_next_supported_skips_unsupported() {
        let supported = [FlashMode::Off, FlashMode::Auto];
        assert_eq!(FlashMode::Off.next_supported(&supported), FlashMode::Auto);
        assert_eq!(FlashMode::Auto.next_supported(&supported), FlashMode::Off);
        assert_eq!(FlashMode::Off.next_supported(&[]), FlashMode::Off);
    }
}
