use crate::error::{LocalizationError, Result};
use crate::models::Rect;
use crate::utils::grayscale::interleaved_to_grayscale;

/// Single-channel 8-bit intensity image, row-major.
///
/// Construction validates the buffer; every later stage derives new images
/// from it and never mutates it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IntensityImage {
    /// Wrap a grayscale buffer (1 byte per pixel)
    pub fn from_gray(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(LocalizationError::malformed(format!(
                "expected {} grayscale bytes for {}x{}, got {}",
                width * height,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert an interleaved 8-bit buffer with 1, 3 (RGB) or 4 (RGBA) channels
    pub fn from_interleaved(
        data: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        if !matches!(channels, 1 | 3 | 4) {
            return Err(LocalizationError::malformed(format!(
                "unsupported channel count {channels}, expected 1, 3 or 4"
            )));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(LocalizationError::malformed(format!(
                "expected {expected} bytes for {width}x{height}x{channels}, got {}",
                data.len()
            )));
        }
        let gray = interleaved_to_grayscale(data, width, height, channels);
        Ok(Self {
            width,
            height,
            data: gray,
        })
    }

    /// Quantize floating point intensities.
    ///
    /// Non-finite samples are rejected; finite samples are rounded and
    /// clamped to `0..=255`.
    pub fn from_f32(data: &[f32], width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(LocalizationError::malformed(format!(
                "expected {} samples for {}x{}, got {}",
                width * height,
                width,
                height,
                data.len()
            )));
        }
        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            return Err(LocalizationError::malformed(format!(
                "non-finite sample at ({}, {})",
                idx % width,
                idx / width
            )));
        }
        let gray = data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Ok(Self {
            width,
            height,
            data: gray,
        })
    }

    /// Convert any decoded `image` crate buffer to luma
    pub fn from_dynamic(img: &image::DynamicImage) -> Result<Self> {
        let luma = img.to_luma8();
        let (width, height) = luma.dimensions();
        Self::from_gray(luma.into_raw(), width as usize, height as usize)
    }

    /// Build from a buffer whose size is already known to match
    pub(crate) fn from_raw_parts(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major pixels
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at (x, y). Caller guarantees bounds.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Copy out a sub-image. The rectangle must lie inside the image and be
    /// non-empty.
    pub fn crop(&self, rect: Rect) -> Result<Self> {
        if rect.width == 0
            || rect.height == 0
            || rect.x + rect.width > self.width
            || rect.y + rect.height > self.height
        {
            return Err(LocalizationError::malformed(format!(
                "crop {:?} outside {}x{} image",
                rect, self.width, self.height
            )));
        }
        let mut data = Vec::with_capacity(rect.area());
        for y in rect.y..rect.y + rect.height {
            data.extend_from_slice(&self.row(y)[rect.x..rect.x + rect.width]);
        }
        Ok(Self {
            width: rect.width,
            height: rect.height,
            data,
        })
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LocalizationError::malformed(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    Ok(())
}
