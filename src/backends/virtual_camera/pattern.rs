// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic test-pattern frames and photos

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, PhotoCodec, PixelFormat, RawPhoto, SensorRotation,
};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

/// Preview frame dimensions produced by the virtual backend
pub const PREVIEW_WIDTH: u32 = 320;
pub const PREVIEW_HEIGHT: u32 = 240;

/// Colour of one test-pattern pixel
///
/// Vertical colour bars, shifted horizontally by `sequence` so consecutive
/// frames differ, with the zoom factor scaling the bar width.
fn pattern_pixel(x: u32, y: u32, width: u32, sequence: u64, zoom: f32) -> [u8; 3] {
    const BARS: [[u8; 3]; 7] = [
        [192, 192, 192],
        [192, 192, 0],
        [0, 192, 192],
        [0, 192, 0],
        [192, 0, 192],
        [192, 0, 0],
        [0, 0, 192],
    ];
    let bar_width = ((width as f32 / BARS.len() as f32) * zoom.max(1.0)).max(1.0) as u64;
    let shifted = (x as u64 + sequence) / bar_width;
    let mut pixel = BARS[(shifted % BARS.len() as u64) as usize];
    // Dark band along the top edge marks "up" for orientation checks
    if y < 8 {
        pixel = [16, 16, 16];
    }
    pixel
}

/// Render an RGBA preview frame
pub fn render_preview(sequence: u64, zoom: f32) -> CameraFrame {
    let mut data = Vec::with_capacity((PREVIEW_WIDTH * PREVIEW_HEIGHT * 4) as usize);
    for y in 0..PREVIEW_HEIGHT {
        for x in 0..PREVIEW_WIDTH {
            let [r, g, b] = pattern_pixel(x, y, PREVIEW_WIDTH, sequence, zoom);
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }

    CameraFrame {
        width: PREVIEW_WIDTH,
        height: PREVIEW_HEIGHT,
        data: Arc::from(data),
        format: PixelFormat::RGBA,
        stride: PREVIEW_WIDTH * 4,
        rotation: SensorRotation::None,
        sequence,
        captured_at: Instant::now(),
    }
}

/// Render a still photo and encode it with `codec`
pub fn render_photo(
    width: u32,
    height: u32,
    sequence: u64,
    zoom: f32,
    codec: PhotoCodec,
) -> BackendResult<RawPhoto> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb(pattern_pixel(x, y, width, sequence, zoom))
    });

    let format = match codec {
        PhotoCodec::Jpeg => ImageFormat::Jpeg,
        PhotoCodec::Png => ImageFormat::Png,
        PhotoCodec::Hevc => {
            return Err(BackendError::Unsupported(
                "HEVC encoding is not available on the virtual camera".to_string(),
            ));
        }
    };

    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, format)
        .map_err(|e| BackendError::CaptureFailed(e.to_string()))?;

    Ok(RawPhoto::Encoded {
        data: Arc::from(encoded.into_inner()),
        codec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_frame_shape() {
        let frame = render_preview(3, 1.0);
        assert_eq!(frame.data.len(), (PREVIEW_WIDTH * PREVIEW_HEIGHT * 4) as usize);
        assert_eq!(frame.stride, PREVIEW_WIDTH * 4);
        assert_eq!(frame.sequence, 3);
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let a = render_preview(0, 1.0);
        let b = render_preview(20, 1.0);
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn test_png_photo_decodes() {
        let RawPhoto::Encoded { data, codec } = render_photo(64, 48, 0, 1.0, PhotoCodec::Png)
            .expect("png encode")
        else {
            panic!("expected encoded photo");
        };
        assert_eq!(codec, PhotoCodec::Png);
        let decoded = image::load_from_memory(&data).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_hevc_is_unsupported() {
        assert!(matches!(
            render_photo(8, 8, 0, 1.0, PhotoCodec::Hevc),
            Err(BackendError::Unsupported(_))
        ));
    }
}
