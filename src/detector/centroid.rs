/// Coarse-to-fine pupil centroid search.
///
/// The pupil is the darkest compact region, so the column and the row with
/// the lowest mean of the binarized image are the best single guess for a
/// line through it. The guess is then refined by re-running the same search
/// inside a window centered on the current estimate.
use log::trace;

use crate::config::WindowPolicy;
use crate::detector::window::centered_window;
use crate::error::Result;
use crate::models::{BinaryMask, IntensityImage, PointI, Rect};
use crate::utils::binarization::binarize;
use crate::utils::profile::{argmin, column_means, row_means};

/// Outcome of the refinement loop
#[derive(Debug, Clone)]
pub struct CentroidEstimate {
    /// Refined centroid in full-image coordinates
    pub centroid: PointI,
    /// Last search window in full-image coordinates
    pub window: Rect,
    /// Centroid relative to the window's top-left corner
    pub local: PointI,
    /// Smoothed pixels of the last window
    pub window_image: IntensityImage,
}

/// Refinement settings
#[derive(Debug, Clone, Copy)]
pub struct RefineParams {
    /// Window side length
    pub window_size: usize,
    /// Number of passes
    pub iterations: usize,
    /// Binarization cutoff
    pub threshold: u8,
    /// Out-of-image window handling
    pub policy: WindowPolicy,
}

/// Column/row minimum-mean position of a binarized image
pub fn mask_centroid(mask: &BinaryMask) -> PointI {
    let x = argmin(&column_means(mask)).unwrap_or(0);
    let y = argmin(&row_means(mask)).unwrap_or(0);
    PointI::new(x, y)
}

/// Refine `start` by repeatedly re-centering a window on the estimate.
///
/// Each pass crops the smoothed image, re-binarizes the crop, runs the
/// minimum-mean search inside it and translates the result back by the
/// window origin. The estimate therefore never leaves the image. With zero
/// passes the window is simply centered on `start`.
pub fn refine_centroid(
    smoothed: &IntensityImage,
    start: PointI,
    params: &RefineParams,
) -> Result<CentroidEstimate> {
    let (width, height) = (smoothed.width(), smoothed.height());
    let mut centroid = start;

    let mut last: Option<(Rect, PointI, IntensityImage)> = None;
    for pass in 0..params.iterations {
        let window = centered_window(centroid, params.window_size, width, height, params.policy)?;
        let window_image = smoothed.crop(window)?;
        let local = mask_centroid(&binarize(&window_image, params.threshold));
        centroid = PointI::new(window.x + local.x, window.y + local.y);
        trace!(
            "refine pass {}: window {:?}, local ({}, {}), centroid ({}, {})",
            pass, window, local.x, local.y, centroid.x, centroid.y
        );
        last = Some((window, local, window_image));
    }

    let (window, local, window_image) = match last {
        Some(found) => found,
        None => {
            let window =
                centered_window(centroid, params.window_size, width, height, params.policy)?;
            let local = PointI::new(centroid.x - window.x, centroid.y - window.y);
            (window, local, smoothed.crop(window)?)
        }
    };

    Ok(CentroidEstimate {
        centroid,
        window,
        local,
        window_image,
    })
}
