use log::debug;

use crate::config::LocalizationParams;
use crate::detector::centroid::{RefineParams, mask_centroid, refine_centroid};
use crate::detector::edges::detect_edges;
use crate::detector::hough::{HoughParams, detect_circles};
use crate::detector::selection::select_closest;
use crate::error::{LocalizationError, Result};
use crate::models::{IntensityImage, IrisLocation, PointI, Rect};
use crate::utils::bilateral::bilateral_filter;
use crate::utils::binarization::binarize;

/// Stage-level record of one localization run.
///
/// Fields are filled as stages complete, so a failed run still shows how far
/// it got.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationTelemetry {
    /// Minimum-mean centroid of the full binarized image
    pub coarse_centroid: Option<PointI>,
    /// Centroid after the refinement passes
    pub refined_centroid: Option<PointI>,
    /// Final search window in full-image coordinates
    pub window: Option<Rect>,
    /// Edge pixels found inside the window
    pub edge_pixels: usize,
    /// Circle candidates produced by the transform
    pub candidates: usize,
}

impl HoughParams {
    fn from_localization(params: &LocalizationParams) -> Self {
        Self {
            resolution: params.hough_resolution,
            min_distance: params.hough_min_distance,
            min_radius: params.min_radius,
            max_radius: params.effective_max_radius(),
            vote_threshold: params.hough_vote_threshold,
        }
    }
}

/// Run every stage on one image.
pub(crate) fn run_localization(
    image: &IntensityImage,
    params: &LocalizationParams,
    tel: &mut LocalizationTelemetry,
) -> Result<IrisLocation> {
    params.validate()?;

    // Preprocessing
    let smoothed = bilateral_filter(image, &params.smoothing);
    let mask = binarize(&smoothed, params.binarize_threshold);

    // Coarse-to-fine centroid
    let coarse = mask_centroid(&mask);
    tel.coarse_centroid = Some(coarse);
    debug!("coarse centroid ({}, {})", coarse.x, coarse.y);

    let refine = RefineParams {
        window_size: params.window_size,
        iterations: params.refine_iterations,
        threshold: params.binarize_threshold,
        policy: params.window_policy,
    };
    let estimate = refine_centroid(&smoothed, coarse, &refine)?;
    tel.refined_centroid = Some(estimate.centroid);
    tel.window = Some(estimate.window);
    debug!(
        "refined centroid ({}, {}) in window {:?}",
        estimate.centroid.x, estimate.centroid.y, estimate.window
    );

    // Edges inside the last window
    let edges = detect_edges(
        &estimate.window_image,
        params.edge_threshold_low,
        params.edge_threshold_high,
    );
    tel.edge_pixels = edges.edge_count();

    // Circle candidates
    let candidates = detect_circles(&edges, &HoughParams::from_localization(params));
    tel.candidates = candidates.len();
    debug!(
        "{} edge pixels, {} circle candidates",
        tel.edge_pixels, tel.candidates
    );

    let best = select_closest(&candidates, estimate.local.to_point()).ok_or(
        LocalizationError::NoCircleDetected {
            edge_pixels: tel.edge_pixels,
        },
    )?;
    debug!(
        "selected circle ({:.1}, {:.1}) r={:.1} votes={}",
        best.center.x, best.center.y, best.radius, best.votes
    );

    // Candidates are window-local; shift by the window origin
    let origin = estimate.window.origin();
    let center = best.center.translate(origin.x as f32, origin.y as f32);
    Ok(IrisLocation::new(
        center.x.round() as i32,
        center.y.round() as i32,
        best.radius.round() as i32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{SyntheticEye, synthetic_eye};

    fn params() -> LocalizationParams {
        LocalizationParams::new(50.0, 100.0, 1.0, 20.0, 63)
    }

    #[test]
    fn test_telemetry_on_success() {
        let img = synthetic_eye(&SyntheticEye::new(320, 280).with_pupil(170.0, 120.0, 30.0));
        let mut tel = LocalizationTelemetry::default();
        let loc = run_localization(&img, &params(), &mut tel).unwrap();

        assert!((loc.center_x - 170).abs() <= 2);
        assert!((loc.center_y - 120).abs() <= 2);
        assert!((loc.radius - 30).abs() <= 2);
        assert_eq!(tel.coarse_centroid, Some(PointI::new(170, 120)));
        assert!(tel.window.unwrap().contains(tel.refined_centroid.unwrap()));
        assert!(tel.edge_pixels > 0);
        assert!(tel.candidates >= 1);
    }

    #[test]
    fn test_telemetry_on_blank_image() {
        let img = synthetic_eye(&SyntheticEye::new(160, 160));
        let mut tel = LocalizationTelemetry::default();
        let err = run_localization(&img, &params(), &mut tel).unwrap_err();

        assert_eq!(err, LocalizationError::NoCircleDetected { edge_pixels: 0 });
        assert_eq!(tel.edge_pixels, 0);
        assert_eq!(tel.candidates, 0);
        assert!(tel.refined_centroid.is_some());
    }

    #[test]
    fn test_invalid_params_fail_before_any_stage() {
        let img = synthetic_eye(&SyntheticEye::new(160, 160));
        let mut tel = LocalizationTelemetry::default();
        let err = run_localization(&img, &params().with_window_size(1), &mut tel);
        assert!(matches!(err, Err(LocalizationError::InvalidParameter { .. })));
        assert_eq!(tel, LocalizationTelemetry::default());
    }
}
