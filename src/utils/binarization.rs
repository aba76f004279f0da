/// Global-threshold binarization.
///
/// Foreground (`true`) is every pixel at or below the cutoff, so the pupil,
/// the darkest compact region of an eye image, ends up as foreground.
use crate::models::{BinaryMask, IntensityImage};

/// Binarize a raw grayscale buffer against `threshold`
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryMask {
    let mut binary = BinaryMask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            binary.set(x, y, gray[idx] <= threshold);
        }
    }

    binary
}

/// Binarize an intensity image against `threshold`
pub fn binarize(image: &IntensityImage, threshold: u8) -> BinaryMask {
    threshold_binarize(image.pixels(), image.width(), image.height(), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarize() {
        let gray = vec![100, 150, 200, 50]; // 2x2 image
        let binary = threshold_binarize(&gray, 2, 2, 128);

        // Pixels <= 128 are foreground
        assert!(binary.get(0, 0)); // 100 <= 128
        assert!(!binary.get(1, 0)); // 150 > 128
        assert!(!binary.get(0, 1)); // 200 > 128
        assert!(binary.get(1, 1)); // 50 <= 128
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let img = IntensityImage::from_gray(vec![62, 63, 64], 3, 1).unwrap();
        let mask = binarize(&img, 63);
        assert!(mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
        assert_eq!((mask.width(), mask.height()), (3, 1));
    }
}
