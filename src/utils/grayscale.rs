/// Grayscale conversion for interleaved 8-bit buffers
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_grayscale(rgb, width, height, 3)
}

/// Convert RGBA image to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_grayscale(rgba, width, height, 4)
}

/// Convert an interleaved buffer with `channels` bytes per pixel.
///
/// One channel is copied through; three or more use the first three as RGB.
/// Rows are processed in parallel. The caller validates the buffer length.
pub fn interleaved_to_grayscale(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Vec<u8> {
    let pixel_count = width * height;
    if channels == 1 {
        return data[..pixel_count].to_vec();
    }

    let mut gray = vec![0u8; pixel_count];
    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * channels;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * channels;
            *out = luma(data[idx], data[idx + 1], data[idx + 2]);
        }
    });

    gray
}
