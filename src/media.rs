//! Image normalization before any image data leaves the process.
//!
//! Uploads are decoded, scaled down so the long side fits [`MAX_DIMENSION`],
//! flattened to RGB and re-encoded as JPEG.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use log::debug;

use crate::error::PostError;
use crate::model::ImagePayload;

/// Longest allowed side of a normalized image, in pixels.
pub const MAX_DIMENSION: u32 = 1024;

/// Upload formats accepted from the user.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg];

/// MIME type of every normalized image.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Target size for an image of `width` x `height`.
///
/// Images within bounds keep their size; larger ones are scaled so the long
/// side equals `max` and the aspect ratio is preserved.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = |side: u32, long: u32| -> u32 {
        ((side as f64 * max as f64 / long as f64).round() as u32).max(1)
    };

    if width > height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Decode, bound and re-encode an image into a bare base64 payload.
pub fn normalize(data: &[u8]) -> Result<ImagePayload, PostError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PostError::MediaProcessing(format!("Failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| PostError::MediaProcessing("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(PostError::MediaProcessing(format!(
            "Unsupported image format: {:?}. Allowed: PNG, JPEG",
            format
        )));
    }

    let img = reader
        .decode()
        .map_err(|e| PostError::MediaProcessing(format!("Failed to decode image: {}", e)))?;

    let (width, height) = fit_within(img.width(), img.height(), MAX_DIMENSION);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        debug!(
            "Resizing image from {}x{} to {}x{}",
            img.width(),
            img.height(),
            width,
            height
        );
        img.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| PostError::MediaProcessing(format!("Failed to encode image: {}", e)))?;

    let encoded = STANDARD.encode(buf.into_inner());
    debug!("Encoded image → {} bytes base64", encoded.len());

    Ok(ImagePayload::new(OUTPUT_MIME_TYPE, encoded))
}

/// Read an image file from disk and normalize it.
pub async fn normalize_file(path: &Path) -> Result<ImagePayload, PostError> {
    let data = tokio::fs::read(path).await?;
    normalize(&data)
}
