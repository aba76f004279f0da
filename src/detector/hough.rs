//! Gradient-directed circle transform.
//!
//! Every edge pixel votes along its gradient line, in both directions, for
//! all radii in the searched range. Circle centers collect votes from the
//! whole boundary and show up as accumulator peaks; each peak then gets the
//! radius best supported by the distances of the edge pixels around it.
//!
//! Peaks are searched on a binomially smoothed copy of the accumulator and
//! refined to sub-cell precision from the raw votes around them, so a
//! symmetric plateau of votes resolves to its middle. Accepted circles are
//! finally refit to the positions of their supporting edge pixels.

use log::trace;

use crate::detector::edges::EdgeMap;
use crate::models::{CircleCandidate, Point};

/// Circle transform settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Inverse accumulator resolution; 1 votes per pixel, 2 per 2x2 block
    pub resolution: f32,
    /// Minimum distance between accepted centers, in pixels
    pub min_distance: f32,
    /// Smallest radius searched
    pub min_radius: usize,
    /// Largest radius searched
    pub max_radius: usize,
    /// Votes a center needs; also the edge support its radius needs
    pub vote_threshold: u32,
}

const KERNEL: [u32; 3] = [1, 2, 1];
const KERNEL_WEIGHT: u32 = 16;

struct Accumulator {
    width: usize,
    height: usize,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            votes: vec![0; width * height],
        }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> u32 {
        self.votes[y * self.width + x]
    }

    /// Copy convolved with [1 2 1] x [1 2 1], borders clamped
    fn smoothed(&self) -> Accumulator {
        let (w, h) = (self.width, self.height);
        let mut out = Accumulator::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let mut sum = 0;
                for (dy, ky) in KERNEL.iter().enumerate() {
                    let yy = (y + dy).saturating_sub(1).min(h - 1);
                    for (dx, kx) in KERNEL.iter().enumerate() {
                        let xx = (x + dx).saturating_sub(1).min(w - 1);
                        sum += kx * ky * self.at(xx, yy);
                    }
                }
                out.votes[y * w + x] = sum;
            }
        }
        out
    }

    /// Vote-weighted offset of the 3x3 neighborhood mass from cell `(x, y)`.
    /// The cell must not lie on the border.
    fn centroid_offset(&self, x: usize, y: usize) -> (f32, f32) {
        let mut total = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for yy in y - 1..=y + 1 {
            for xx in x - 1..=x + 1 {
                let v = self.at(xx, yy) as f32;
                total += v;
                sx += v * (xx as f32 - x as f32);
                sy += v * (yy as f32 - y as f32);
            }
        }
        if total > 0.0 {
            (sx / total, sy / total)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Run the transform over `map`. Candidates come back in acceptance order:
/// strongest smoothed peak first, ties in scan order.
pub fn detect_circles(map: &EdgeMap, params: &HoughParams) -> Vec<CircleCandidate> {
    // No circle inside the map is larger than its diagonal
    let (w, h) = (map.width() as f32, map.height() as f32);
    let diagonal = (w * w + h * h).sqrt().ceil() as usize;
    let params = &HoughParams {
        max_radius: params.max_radius.min(diagonal),
        ..*params
    };

    let points = map.edge_points();
    if points.is_empty() || params.min_radius > params.max_radius {
        return Vec::new();
    }

    let acc = vote(map, &points, params);
    let smoothed = acc.smoothed();
    let peaks = find_peaks(&smoothed, params.vote_threshold.saturating_mul(KERNEL_WEIGHT));
    trace!("circle transform: {} edge pixels, {} peaks", points.len(), peaks.len());

    let min_dist_sq = params.min_distance * params.min_distance;
    let mut circles: Vec<CircleCandidate> = Vec::new();
    // Thinning compares accumulator centers, before the geometric fit
    let mut accepted: Vec<Point> = Vec::new();
    for (ax, ay) in peaks {
        let (ox, oy) = acc.centroid_offset(ax, ay);
        let center = Point::new(
            (ax as f32 + ox) * params.resolution,
            (ay as f32 + oy) * params.resolution,
        );
        if accepted
            .iter()
            .any(|c| c.distance_squared(&center) < min_dist_sq)
        {
            continue;
        }
        if let Some((radius, support)) = estimate_radius(center, &points, params) {
            if support >= params.vote_threshold as usize {
                let (fitted, fitted_radius) = fit_circle(center, radius, &points);
                accepted.push(center);
                circles.push(CircleCandidate {
                    center: fitted,
                    radius: fitted_radius,
                    votes: acc.at(ax, ay),
                });
            }
        }
    }
    circles
}

fn vote(map: &EdgeMap, points: &[(usize, usize)], params: &HoughParams) -> Accumulator {
    let w = map.width();
    let h = map.height();
    let inv = 1.0 / params.resolution;
    let acc_w = ((w - 1) as f32 * inv).round() as usize + 1;
    let acc_h = ((h - 1) as f32 * inv).round() as usize + 1;
    let mut acc = Accumulator::new(acc_w, acc_h);

    let max_x = (w - 1) as f32;
    let max_y = (h - 1) as f32;

    for &(x, y) in points {
        let idx = y * w + x;
        let gx = map.gx[idx];
        let gy = map.gy[idx];
        let norm = (gx * gx + gy * gy).sqrt();
        if norm <= f32::EPSILON {
            continue;
        }
        let ux = gx / norm;
        let uy = gy / norm;

        for sign in [1.0f32, -1.0] {
            for r in params.min_radius..=params.max_radius {
                let px = x as f32 + sign * r as f32 * ux;
                let py = y as f32 + sign * r as f32 * uy;
                if px < 0.0 || py < 0.0 || px > max_x || py > max_y {
                    break;
                }
                let cx = ((px * inv).round() as usize).min(acc_w - 1);
                let cy = ((py * inv).round() as usize).min(acc_h - 1);
                acc.votes[cy * acc_w + cx] += 1;
            }
        }
    }
    acc
}

/// Local maxima of the accumulator at or above `threshold`, strongest first.
/// Plateaus resolve to their top-left cell.
fn find_peaks(acc: &Accumulator, threshold: u32) -> Vec<(usize, usize)> {
    if acc.width < 3 || acc.height < 3 {
        return Vec::new();
    }

    let mut peaks: Vec<(usize, usize, u32)> = Vec::new();

    for y in 1..acc.height - 1 {
        for x in 1..acc.width - 1 {
            let v = acc.at(x, y);
            if v >= threshold
                && v > acc.at(x - 1, y)
                && v >= acc.at(x + 1, y)
                && v > acc.at(x, y - 1)
                && v >= acc.at(x, y + 1)
            {
                peaks.push((x, y, v));
            }
        }
    }
    // Stable sort keeps scan order among equal strengths
    peaks.sort_by(|a, b| b.2.cmp(&a.2));
    peaks.into_iter().map(|(x, y, _)| (x, y)).collect()
}

/// Radius with the most edge support around `center`, using 1-pixel bins
/// and a 3-bin window. Returns the mean distance inside the window and the
/// number of supporting edge pixels.
fn estimate_radius(
    center: Point,
    points: &[(usize, usize)],
    params: &HoughParams,
) -> Option<(f32, usize)> {
    let bins = params.max_radius + 2;
    let mut counts = vec![0usize; bins];
    let mut sums = vec![0.0f32; bins];

    for &(x, y) in points {
        let d = center.distance(&Point::new(x as f32, y as f32));
        let bin = d.round() as usize;
        if bin < params.min_radius || bin > params.max_radius {
            continue;
        }
        counts[bin] += 1;
        sums[bin] += d;
    }

    let mut best: Option<(usize, usize)> = None;
    for r in params.min_radius..=params.max_radius {
        let lo = r.saturating_sub(1);
        let hi = (r + 1).min(bins - 1);
        let support: usize = counts[lo..=hi].iter().sum();
        if support > best.map_or(0, |(_, s)| s) {
            best = Some((r, support));
        }
    }

    let (r, support) = best?;
    let lo = r.saturating_sub(1);
    let hi = (r + 1).min(bins - 1);
    let total: f32 = sums[lo..=hi].iter().sum();
    Some((total / support as f32, support))
}

const FIT_ITERATIONS: usize = 5;
const FIT_BAND: f64 = 2.0;

/// Gauss-Newton least-squares fit of center and radius to the edge pixels
/// lying within `FIT_BAND` of the current circle.
///
/// Gradient directions carry a few degrees of error, which shifts the
/// accumulator peak by up to `r * error` on large circles; the fit uses
/// pixel positions only. Falls back to the initial circle when too few
/// pixels support it or the normal equations are singular.
fn fit_circle(center: Point, radius: f32, points: &[(usize, usize)]) -> (Point, f32) {
    let mut cx = center.x as f64;
    let mut cy = center.y as f64;
    let mut r = radius as f64;

    for _ in 0..FIT_ITERATIONS {
        // Normal equations J^T J delta = -J^T res over (cx, cy, r)
        let mut jtj = [[0.0f64; 3]; 3];
        let mut jtr = [0.0f64; 3];
        let mut inliers = 0usize;
        for &(x, y) in points {
            let dx = cx - x as f64;
            let dy = cy - y as f64;
            let d = (dx * dx + dy * dy).sqrt();
            if d < 1e-6 || (d - r).abs() > FIT_BAND {
                continue;
            }
            let j = [dx / d, dy / d, -1.0];
            let res = d - r;
            for row in 0..3 {
                jtr[row] += j[row] * res;
                for col in 0..3 {
                    jtj[row][col] += j[row] * j[col];
                }
            }
            inliers += 1;
        }
        if inliers < 3 {
            break;
        }
        let Some(delta) = solve3(&jtj, &[-jtr[0], -jtr[1], -jtr[2]]) else {
            break;
        };
        cx += delta[0];
        cy += delta[1];
        r += delta[2];
        if delta.iter().all(|v| v.abs() < 1e-3) {
            break;
        }
    }

    if cx.is_finite() && cy.is_finite() && r.is_finite() && r > 0.0 {
        (Point::new(cx as f32, cy as f32), r as f32)
    } else {
        (center, radius)
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Cramer's rule; `None` for a near-singular system
fn solve3(m: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let d = det3(m);
    if d.abs() < 1e-9 {
        return None;
    }
    let mut out = [0.0f64; 3];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut mc = *m;
        for row in 0..3 {
            mc[row][col] = b[row];
        }
        *slot = det3(&mc) / d;
    }
    Some(out)
}
