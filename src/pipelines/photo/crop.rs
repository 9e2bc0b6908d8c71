// SPDX-License-Identifier: GPL-3.0-only

//! Aspect-ratio center crop policy
//!
//! Ratios are expressed long side : short side and applied in the source
//! frame's own orientation. The short side is always kept whole; only the
//! long side is trimmed. When the requested ratio would need a long side
//! longer than the source has, the crop is skipped and the full frame kept.
//! The policy never upsamples and never exceeds the source bounds.

use serde::{Deserialize, Serialize};

/// Requested photo aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Keep the sensor's native framing (default)
    #[default]
    Native,
    /// 1:1
    Square,
    /// 4:3
    FourThree,
    /// 16:9
    SixteenNine,
}

/// Crop rectangle in source pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Native,
        AspectRatio::Square,
        AspectRatio::FourThree,
        AspectRatio::SixteenNine,
    ];

    /// (long, short) ratio terms, `None` for native framing
    pub fn terms(&self) -> Option<(u32, u32)> {
        match self {
            AspectRatio::Native => None,
            AspectRatio::Square => Some((1, 1)),
            AspectRatio::FourThree => Some((4, 3)),
            AspectRatio::SixteenNine => Some((16, 9)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AspectRatio::Native => "Default",
            AspectRatio::Square => "1:1",
            AspectRatio::FourThree => "4:3",
            AspectRatio::SixteenNine => "16:9",
        }
    }

    /// Centered crop of a `width` x `height` source, or `None` to keep the full frame
    pub fn crop_rect(&self, width: u32, height: u32) -> Option<CropRect> {
        let (long_term, short_term) = self.terms()?;
        if width == 0 || height == 0 {
            return None;
        }

        let landscape = width >= height;
        let (source_long, source_short) = if landscape {
            (width, height)
        } else {
            (height, width)
        };

        let target_long = (source_short as u64 * long_term as u64 / short_term as u64) as u32;
        if target_long > source_long {
            return None;
        }

        let offset = (source_long - target_long) / 2;
        Some(if landscape {
            CropRect {
                x: offset,
                y: 0,
                width: target_long,
                height: source_short,
            }
        } else {
            CropRect {
                x: 0,
                y: offset,
                width: source_short,
                height: target_long,
            }
        })
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
