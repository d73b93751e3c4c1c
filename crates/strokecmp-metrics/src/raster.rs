//! Pixel buffer construction.
//!
//! Turns rendered screenshots (PNG, JPEG, BMP, WebP bytes) or raw RGBA
//! slices into the [`RgbaImage`] buffers the coverage analyzer scans.
//! Rendering the drawings themselves happens elsewhere.

use crate::types::{MetricsError, RgbaImage};

/// Decode raw image bytes into an RGBA pixel buffer.
///
/// Any format the `image` crate can decode is accepted; images without
/// an alpha channel get an opaque one.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyImageData`] if `bytes` is empty.
/// Returns [`MetricsError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded pixel buffer"]
pub fn decode_pixel_buffer(bytes: &[u8]) -> Result<RgbaImage, MetricsError> {
    if bytes.is_empty() {
        return Err(MetricsError::EmptyImageData);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Wrap raw row-major RGBA8 data as a pixel buffer.
///
/// # Errors
///
/// Returns [`MetricsError::InvalidBuffer`] if either dimension is zero or
/// `data.len()` is not `width * height * 4`.
pub fn pixel_buffer_from_raw(
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Result<RgbaImage, MetricsError> {
    if width == 0 || height == 0 {
        return Err(MetricsError::InvalidBuffer {
            width,
            height,
            reason: "width and height must be non-zero",
        });
    }
    let mismatch = MetricsError::InvalidBuffer {
        width,
        height,
        reason: "data length does not match width * height * 4",
    };
    let expected = u64::from(width) * u64::from(height) * 4;
    if u64::try_from(data.len()).ok() != Some(expected) {
        return Err(mismatch);
    }
    RgbaImage::from_raw(width, height, data).ok_or(mismatch)
}
