/// Row and column intensity profiles of a binarized image.
///
/// The mask is read as a two-valued image (foreground 0, background 255),
/// so the lowest mean marks the line crossing the most dark pixels.
use crate::models::BinaryMask;

const BACKGROUND_LEVEL: f32 = 255.0;

/// Mean two-valued intensity of every column
pub fn column_means(mask: &BinaryMask) -> Vec<f32> {
    let h = mask.height().max(1) as f32;
    mask.column_counts()
        .into_iter()
        .map(|fg| BACKGROUND_LEVEL * (1.0 - fg as f32 / h))
        .collect()
}

/// Mean two-valued intensity of every row
pub fn row_means(mask: &BinaryMask) -> Vec<f32> {
    let w = mask.width().max(1) as f32;
    mask.row_counts()
        .into_iter()
        .map(|fg| BACKGROUND_LEVEL * (1.0 - fg as f32 / w))
        .collect()
}

/// Index of the smallest value; the first one wins on ties
pub fn argmin(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmin_first_wins() {
        assert_eq!(argmin(&[3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(argmin(&[5.0, 5.0]), Some(0));
        assert_eq!(argmin(&[]), None);
    }

    #[test]
    fn test_means_follow_foreground() {
        let mut mask = BinaryMask::new(4, 2);
        mask.set(2, 0, true);
        mask.set(2, 1, true);
        mask.set(1, 1, true);

        let cols = column_means(&mask);
        assert_eq!(cols, vec![255.0, 127.5, 0.0, 255.0]);
        assert_eq!(argmin(&cols), Some(2));

        let rows = row_means(&mask);
        assert_eq!(argmin(&rows), Some(1));
    }

    #[test]
    fn test_empty_mask_is_flat() {
        let mask = BinaryMask::new(5, 5);
        let cols = column_means(&mask);
        assert!(cols.iter().all(|&v| v == 255.0));
        assert_eq!(argmin(&cols), Some(0));
    }
}
