//! Multi-stage edge detection: binomial pre-smoothing, Scharr gradients,
//! non-maximum suppression and double-threshold hysteresis.
//!
//! Gradients are scaled to Sobel units (Scharr weights sum to 16, Sobel to 4)
//! so thresholds keep the meaning they have with a plain 3x3 Sobel operator.
//! The repeated 3x3 binomial pass steadies gradient directions along curved
//! boundaries, which the circle transform votes along.

use crate::models::{BinaryMask, IntensityImage};

const SCHARR_TO_SOBEL: f32 = 0.25;
const SMOOTH_PASSES: usize = 3;

/// Binary edge map plus the gradient field it was computed from
#[derive(Debug, Clone)]
pub struct EdgeMap {
    /// Edge pixels
    pub edges: BinaryMask,
    /// Horizontal gradient, row-major
    pub gx: Vec<f32>,
    /// Vertical gradient, row-major
    pub gy: Vec<f32>,
}

impl EdgeMap {
    /// Map width
    pub fn width(&self) -> usize {
        self.edges.width()
    }

    /// Map height
    pub fn height(&self) -> usize {
        self.edges.height()
    }

    /// Number of edge pixels
    pub fn edge_count(&self) -> usize {
        self.edges.count_foreground()
    }

    /// Coordinates of every edge pixel in scan order
    pub fn edge_points(&self) -> Vec<(usize, usize)> {
        let mut points = Vec::new();
        for y in 0..self.height() {
            for x in 0..self.width() {
                if self.edges.get(x, y) {
                    points.push((x, y));
                }
            }
        }
        points
    }
}

/// Detect edges with hysteresis thresholds `low` and `high` (swapped if given
/// in the wrong order). The output has the same size as the input.
pub fn detect_edges(image: &IntensityImage, low: f32, high: f32) -> EdgeMap {
    let w = image.width();
    let h = image.height();
    let (low, high) = if high < low { (high, low) } else { (low, high) };

    let mut smooth: Vec<f32> = image.pixels().iter().map(|&v| v as f32).collect();
    for _ in 0..SMOOTH_PASSES {
        smooth = smooth_binomial3(&smooth, w, h);
    }
    let (gx, gy, mag) = scharr(&smooth, w, h);
    let nms = non_max_suppression(&gx, &gy, &mag, w, h);
    let edges = hysteresis(&nms, w, h, low, high);

    EdgeMap { edges, gx, gy }
}

/// Separable [1 2 1] / 4 smoothing with clamped borders
fn smooth_binomial3(src: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let xm = x.saturating_sub(1);
            let xp = (x + 1).min(w - 1);
            let row = y * w;
            tmp[row + x] = (src[row + xm] + 2.0 * src[row + x] + src[row + xp]) * 0.25;
        }
    }

    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        let ym = y.saturating_sub(1);
        let yp = (y + 1).min(h - 1);
        for x in 0..w {
            out[y * w + x] = (tmp[ym * w + x] + 2.0 * tmp[y * w + x] + tmp[yp * w + x]) * 0.25;
        }
    }
    out
}

fn scharr(src: &[f32], w: usize, h: usize) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];
    let mut mag = vec![0.0f32; w * h];
    if w < 3 || h < 3 {
        return (gx, gy, mag);
    }

    for y in 1..(h - 1) {
        for x in 1..(w - 1) {
            let p00 = src[(y - 1) * w + x - 1];
            let p01 = src[(y - 1) * w + x];
            let p02 = src[(y - 1) * w + x + 1];
            let p10 = src[y * w + x - 1];
            let p12 = src[y * w + x + 1];
            let p20 = src[(y + 1) * w + x - 1];
            let p21 = src[(y + 1) * w + x];
            let p22 = src[(y + 1) * w + x + 1];

            let gxx = ((3.0 * p02 + 10.0 * p12 + 3.0 * p22) - (3.0 * p00 + 10.0 * p10 + 3.0 * p20))
                * SCHARR_TO_SOBEL;
            let gyy = ((3.0 * p20 + 10.0 * p21 + 3.0 * p22) - (3.0 * p00 + 10.0 * p01 + 3.0 * p02))
                * SCHARR_TO_SOBEL;

            let idx = y * w + x;
            gx[idx] = gxx;
            gy[idx] = gyy;
            mag[idx] = (gxx * gxx + gyy * gyy).sqrt();
        }
    }
    (gx, gy, mag)
}

/// Keep local maxima along the gradient direction. The comparison is strict
/// on one side so a step edge comes out one pixel thick.
fn non_max_suppression(gx: &[f32], gy: &[f32], mag: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut nms = vec![0.0f32; w * h];
    if w < 3 || h < 3 {
        return nms;
    }

    const TAN22_5: f32 = 0.414_213_57;
    const TAN67_5: f32 = 2.414_213_7;

    for y in 1..(h - 1) {
        for x in 1..(w - 1) {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= 0.0 {
                continue;
            }

            let gxx = gx[idx];
            let gyy = gy[idx];
            let ax = gxx.abs();
            let ay = gyy.abs();

            let keep = if ay <= ax * TAN22_5 {
                m > mag[idx - 1] && m >= mag[idx + 1]
            } else if ay >= ax * TAN67_5 {
                m > mag[idx - w] && m >= mag[idx + w]
            } else if gxx * gyy > 0.0 {
                m > mag[idx - w - 1] && m > mag[idx + w + 1]
            } else {
                m > mag[idx - w + 1] && m > mag[idx + w - 1]
            };

            if keep {
                nms[idx] = m;
            }
        }
    }
    nms
}

/// Seed from pixels at or above `high`, then grow through 8-connected pixels
/// at or above `low`.
fn hysteresis(nms: &[f32], w: usize, h: usize, low: f32, high: f32) -> BinaryMask {
    let mut edges = BinaryMask::new(w, h);
    let mut stack = Vec::new();

    for (idx, &v) in nms.iter().enumerate() {
        if v > 0.0 && v >= high {
            edges.set(idx % w, idx / w, true);
            stack.push(idx);
        }
    }

    while let Some(idx) = stack.pop() {
        let x = idx % w;
        let y = idx / w;

        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(w - 1);

        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let nidx = ny * w + nx;
                let v = nms[nidx];
                if v > 0.0 && v >= low && !edges.get(nx, ny) {
                    edges.set(nx, ny, true);
                    stack.push(nidx);
                }
            }
        }
    }

    edges
}
