/// Edge-preserving bilateral smoothing.
///
/// Each output pixel is a weighted mean over a circular neighborhood; the
/// weight is the product of a spatial Gaussian on the pixel offset and a
/// range Gaussian on the intensity difference. Flat regions are smoothed
/// while strong discontinuities such as the pupil boundary stay sharp.
use crate::models::IntensityImage;
use rayon::prelude::*;

/// Bilateral filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralParams {
    /// Neighborhood diameter in pixels
    pub diameter: usize,
    /// Range sigma, in intensity units
    pub sigma_color: f32,
    /// Spatial sigma, in pixels
    pub sigma_space: f32,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
        }
    }
}

struct Tap {
    dx: isize,
    dy: isize,
    weight: f32,
}

fn spatial_taps(params: &BilateralParams) -> Vec<Tap> {
    let radius = (params.diameter / 2) as isize;
    let coeff = -0.5 / (params.sigma_space * params.sigma_space);
    let mut taps = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2 > (radius * radius) as f32 {
                continue;
            }
            taps.push(Tap {
                dx,
                dy,
                weight: (r2 * coeff).exp(),
            });
        }
    }
    taps
}

fn color_lut(params: &BilateralParams) -> [f32; 256] {
    let coeff = -0.5 / (params.sigma_color * params.sigma_color);
    let mut lut = [0.0f32; 256];
    for (d, w) in lut.iter_mut().enumerate() {
        let d = d as f32;
        *w = (d * d * coeff).exp();
    }
    lut
}

/// Mirror an index into `0..len` without repeating the edge pixel
#[inline]
fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = (2 * len - 2) as isize;
    let r = i.rem_euclid(period) as usize;
    if r < len { r } else { 2 * len - 2 - r }
}

/// Apply the bilateral filter, producing a new image of the same size.
///
/// Rows are filtered in parallel; every output pixel depends only on the
/// input, so the result is independent of thread scheduling.
pub fn bilateral_filter(image: &IntensityImage, params: &BilateralParams) -> IntensityImage {
    let width = image.width();
    let height = image.height();
    let src = image.pixels();

    if params.diameter <= 1 {
        return image.clone();
    }

    let taps = spatial_taps(params);
    let lut = color_lut(params);

    let mut out = vec![0u8; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let center = src[y * width + x];
            let mut sum = 0.0f32;
            let mut norm = 0.0f32;
            for tap in &taps {
                let sx = reflect101(x as isize + tap.dx, width);
                let sy = reflect101(y as isize + tap.dy, height);
                let v = src[sy * width + sx];
                let w = tap.weight * lut[v.abs_diff(center) as usize];
                sum += w * v as f32;
                norm += w;
            }
            *dst = (sum / norm).round().clamp(0.0, 255.0) as u8;
        }
    });

    IntensityImage::from_raw_parts(out, width, height)
}
