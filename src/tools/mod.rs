//! Helpers shared by tests and benchmarks: synthetic eye images and quick
//! statistics over intermediate buffers.

use crate::models::{BinaryMask, IntensityImage};

/// Description of a synthetic eye: a dark pupil disk, an optional concentric
/// iris ring and a bright background.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEye {
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Pupil `(center_x, center_y, radius)`; `None` renders a blank image
    pub pupil: Option<(f32, f32, f32)>,
    /// Iris `(radius, level)` around the pupil center
    pub iris: Option<(f32, u8)>,
    /// Pupil intensity
    pub pupil_level: u8,
    /// Background intensity
    pub background_level: u8,
    /// Uniform noise `(amplitude, seed)`
    pub noise: Option<(u8, u64)>,
}

impl SyntheticEye {
    /// Blank bright image of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pupil: None,
            iris: None,
            pupil_level: 30,
            background_level: 200,
            noise: None,
        }
    }

    /// Add a pupil disk
    pub fn with_pupil(mut self, cx: f32, cy: f32, radius: f32) -> Self {
        self.pupil = Some((cx, cy, radius));
        self
    }

    /// Add an iris ring of the given outer radius and intensity
    pub fn with_iris(mut self, radius: f32, level: u8) -> Self {
        self.iris = Some((radius, level));
        self
    }

    /// Override pupil and background intensities
    pub fn with_levels(mut self, pupil: u8, background: u8) -> Self {
        self.pupil_level = pupil;
        self.background_level = background;
        self
    }

    /// Add deterministic uniform noise in `[-amplitude, amplitude]`
    pub fn with_noise(mut self, amplitude: u8, seed: u64) -> Self {
        self.noise = Some((amplitude, seed));
        self
    }
}

/// Render a synthetic eye. A pixel belongs to a disk when its center lies
/// within the disk radius. Dimensions must be non-zero.
pub fn synthetic_eye(eye: &SyntheticEye) -> IntensityImage {
    let mut data = vec![eye.background_level; eye.width * eye.height];
    let mut rng = eye.noise.map(|(amp, seed)| (amp, XorShift::new(seed)));

    for y in 0..eye.height {
        for x in 0..eye.width {
            let mut level = eye.background_level;
            if let Some((cx, cy, r)) = eye.pupil {
                let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                if let Some((iris_r, iris_level)) = eye.iris {
                    if d2 <= iris_r * iris_r {
                        level = iris_level;
                    }
                }
                if d2 <= r * r {
                    level = eye.pupil_level;
                }
            }
            if let Some((amp, rng)) = rng.as_mut() {
                let span = 2 * *amp as i32 + 1;
                let offset = (rng.next() % span as u64) as i32 - *amp as i32;
                level = (level as i32 + offset).clamp(0, 255) as u8;
            }
            data[y * eye.width + x] = level;
        }
    }

    IntensityImage::from_raw_parts(data, eye.width, eye.height)
}

struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary mask.
#[derive(Debug, Clone, Copy)]
pub struct MaskStats {
    /// Count of foreground pixels.
    pub foreground_pixels: usize,
    /// Total pixels in the mask.
    pub total_pixels: usize,
    /// Ratio of foreground pixels to total pixels.
    pub foreground_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Compute foreground pixel stats for a mask.
pub fn mask_stats(mask: &BinaryMask) -> MaskStats {
    let foreground = mask.count_foreground();
    let total = mask.width() * mask.height();
    let ratio = if total == 0 {
        0.0
    } else {
        foreground as f64 / total as f64
    };
    MaskStats {
        foreground_pixels: foreground,
        total_pixels: total,
        foreground_ratio: ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::binarization::binarize;

    #[test]
    fn test_synthetic_disk_area() {
        let img = synthetic_eye(&SyntheticEye::new(100, 100).with_pupil(50.0, 50.0, 10.0));
        let stats = mask_stats(&binarize(&img, 63));
        // pi * 10^2 ~= 314 lattice points, give or take the boundary
        assert!((300..=330).contains(&stats.foreground_pixels));
        assert_eq!(stats.total_pixels, 10_000);
    }

    #[test]
    fn test_iris_ring_levels() {
        let img = synthetic_eye(
            &SyntheticEye::new(100, 100)
                .with_pupil(50.0, 50.0, 10.0)
                .with_iris(30.0, 110),
        );
        assert_eq!(img.get(50, 50), 30);
        assert_eq!(img.get(70, 50), 110);
        assert_eq!(img.get(95, 50), 200);
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let eye = SyntheticEye::new(40, 40).with_noise(5, 7);
        let a = synthetic_eye(&eye);
        let b = synthetic_eye(&eye);
        assert_eq!(a, b);
        let stats = grayscale_stats(a.pixels());
        assert!(stats.min >= 195 && stats.max <= 205);
    }
}
