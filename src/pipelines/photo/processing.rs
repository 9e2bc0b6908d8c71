// SPDX-License-Identifier: MPL-2.0

//! Photo decoding and aspect-ratio cropping
//!
//! Decoding runs on the hardware callback thread (it touches no controller
//! state); cropping runs inside the controller once the configured ratio is
//! known.

use super::crop::{AspectRatio, CropRect};
use super::{CapturedPhoto, PhotoMetadata};
use crate::backends::camera::types::{BackendError, BackendResult, FrameData, PhotoCodec, RawPhoto};
use image::RgbaImage;
use tracing::debug;

/// A photo decoded to RGBA but not yet cropped
#[derive(Debug, Clone)]
pub struct DecodedPhoto {
    pub image: RgbaImage,
    /// Bytes exactly as the hardware delivered them, when encoded
    pub encoded: Option<FrameData>,
    /// Codec the hardware actually used, when encoded
    pub codec: Option<PhotoCodec>,
}

/// Decode a raw hardware photo into the working RGBA representation
pub fn decode_raw_photo(raw: RawPhoto) -> BackendResult<DecodedPhoto> {
    match raw {
        RawPhoto::Encoded { data, codec } => {
            let image = image::load_from_memory(&data)
                .map_err(|e| BackendError::Decode(e.to_string()))?
                .to_rgba8();
            debug!(
                width = image.width(),
                height = image.height(),
                bytes = data.len(),
                ?codec,
                "Decoded photo"
            );
            Ok(DecodedPhoto {
                image,
                encoded: Some(data),
                codec: Some(codec),
            })
        }
        RawPhoto::Rgba {
            width,
            height,
            data,
        } => {
            let expected = width as usize * height as usize * 4;
            if data.len() < expected {
                return Err(BackendError::Decode(format!(
                    "RGBA data too small: expected {}, got {}",
                    expected,
                    data.len()
                )));
            }
            let image = RgbaImage::from_raw(width, height, data[..expected].to_vec())
                .ok_or_else(|| BackendError::Decode("Invalid RGBA dimensions".to_string()))?;
            Ok(DecodedPhoto {
                image,
                encoded: None,
                codec: None,
            })
        }
    }
}

/// Apply the aspect-ratio crop policy to `image`
///
/// Returns the (possibly unchanged) image and the rectangle applied.
pub fn crop_to_ratio(image: RgbaImage, ratio: AspectRatio) -> (RgbaImage, Option<CropRect>) {
    match ratio.crop_rect(image.width(), image.height()) {
        Some(rect) if (rect.width, rect.height) != image.dimensions() => {
            let cropped =
                image::imageops::crop_imm(&image, rect.x, rect.y, rect.width, rect.height)
                    .to_image();
            (cropped, Some(rect))
        }
        _ => (image, None),
    }
}

/// Crop a decoded photo and attach its metadata
pub fn finish_photo(
    decoded: DecodedPhoto,
    ratio: AspectRatio,
    mut metadata: PhotoMetadata,
) -> CapturedPhoto {
    metadata.source_width = decoded.image.width();
    metadata.source_height = decoded.image.height();
    if let Some(codec) = decoded.codec {
        metadata.codec = codec;
    }

    let (image, crop) = crop_to_ratio(decoded.image, ratio);
    metadata.crop = crop;

    CapturedPhoto::new(image, decoded.encoded, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_decode_rgba_rejects_short_buffer() {
        let raw = RawPhoto::Rgba {
            width: 4,
            height: 4,
            data: Arc::from(vec![0u8; 10]),
        };
        assert!(matches!(decode_raw_photo(raw), Err(BackendError::Decode(_))));
    }

    #[test]
    fn test_decode_garbage_bytes_fails() {
        let raw = RawPhoto::Encoded {
            data: Arc::from(vec![1u8, 2, 3]),
            codec: PhotoCodec::Jpeg,
        };
        assert!(decode_raw_photo(raw).is_err());
    }

    #[test]
    fn test_crop_keeps_center() {
        let image = RgbaImage::from_fn(8, 6, |x, _| image::Rgba([x as u8, 0, 0, 255]));
        let (cropped, rect) = crop_to_ratio(image, AspectRatio::Square);
        assert_eq!(cropped.dimensions(), (6, 6));
        assert_eq!(rect.map(|r| r.x), Some(1));
        assert_eq!(cropped.get_pixel(0, 0)[0], 1);
    }

    #[test]
    fn test_matching_ratio_is_not_a_crop() {
        let image = RgbaImage::new(8, 6);
        let (cropped, rect) = crop_to_ratio(image, AspectRatio::FourThree);
        assert_eq!(cropped.dimensions(), (8, 6));
        assert_eq!(rect, None);
    }

    #[test]
    fn test_finish_records_source_and_crop() {
        let decoded = DecodedPhoto {
            image: RgbaImage::new(40, 30),
            encoded: None,
            codec: None,
        };
        let photo = finish_photo(decoded, AspectRatio::Square, PhotoMetadata::default());
        assert_eq!(photo.image.dimensions(), (30, 30));
        assert_eq!(photo.metadata.source_width, 40);
        assert_eq!(photo.metadata.source_height, 30);
        assert_eq!(
            photo.metadata.crop,
            Some(CropRect {
                x: 5,
                y: 0,
                width: 30,
                height: 30
            })
        );
    }
}
