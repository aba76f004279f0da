//! iris_locate - pupil and iris boundary localization
//!
//! Finds the pupil circle (center and radius) in a grayscale eye image, the
//! first stage of an iris-recognition pipeline. Each image runs through:
//!
//! 1. Bilateral smoothing and global-threshold binarization
//! 2. Coarse-to-fine centroid search over minimum-mean rows and columns
//! 3. Hysteresis edge detection inside a window around the centroid
//! 4. A circle transform, keeping the candidate closest to the centroid
//!
//! Images are independent: every entry point is a pure function of the image
//! and the parameters, and batch entry points return one result per image in
//! input order.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Localization parameters and environment overrides
pub mod config;
/// Localization stages (centroid, window, edges, circles, selection)
pub mod detector;
/// Error type
pub mod error;
/// Core data structures (IntensityImage, BinaryMask, IrisLocation, etc.)
pub mod models;
/// Stage sequencing and telemetry
pub mod pipeline;
/// Synthetic images and buffer statistics for tests and benchmarks
pub mod tools;
/// Utility functions (grayscale, smoothing, binarization, profiles)
pub mod utils;

pub use config::{LocalizationParams, WindowPolicy};
pub use error::{LocalizationError, Result};
pub use models::{BinaryMask, CircleCandidate, IntensityImage, IrisLocation, Point, PointI, Rect};
pub use pipeline::LocalizationTelemetry;

use log::warn;
use rayon::prelude::*;

/// Locate the pupil boundary in each image
///
/// # Arguments
/// * `images` - Grayscale eye images
/// * `edge_threshold_low` - Hysteresis low bound for edge linking
/// * `edge_threshold_high` - Hysteresis high bound for edge linking
/// * `hough_resolution` - Inverse accumulator resolution of the circle transform
/// * `hough_min_distance` - Minimum distance between detected circle centers
/// * `binarize_threshold` - Intensity cutoff separating pupil from background
///
/// # Returns
/// One `Result` per image, in input order. A failure on one image does not
/// affect the others.
///
/// # Example
/// ```
/// use iris_locate::tools::{SyntheticEye, synthetic_eye};
///
/// let eye = synthetic_eye(&SyntheticEye::new(320, 280).with_pupil(160.0, 140.0, 30.0));
/// let results = iris_locate::locate_iris(&[eye], 50.0, 100.0, 1.0, 20.0, 63);
/// let loc = results[0].as_ref().unwrap();
/// assert!((loc.center_x - 160).abs() <= 2);
/// ```
pub fn locate_iris(
    images: &[IntensityImage],
    edge_threshold_low: f32,
    edge_threshold_high: f32,
    hough_resolution: f32,
    hough_min_distance: f32,
    binarize_threshold: u8,
) -> Vec<Result<IrisLocation>> {
    let params = LocalizationParams::new(
        edge_threshold_low,
        edge_threshold_high,
        hough_resolution,
        hough_min_distance,
        binarize_threshold,
    );
    IrisLocalizer::new(params).locate_batch(images)
}

/// Same as [`locate_iris`], processing images on the rayon thread pool.
///
/// Results are identical to the sequential version and keep input order.
pub fn locate_iris_parallel(
    images: &[IntensityImage],
    edge_threshold_low: f32,
    edge_threshold_high: f32,
    hough_resolution: f32,
    hough_min_distance: f32,
    binarize_threshold: u8,
) -> Vec<Result<IrisLocation>> {
    let params = LocalizationParams::new(
        edge_threshold_low,
        edge_threshold_high,
        hough_resolution,
        hough_min_distance,
        binarize_threshold,
    );
    IrisLocalizer::new(params).locate_batch_parallel(images)
}

/// Locate the pupil boundary in one image
pub fn locate_single(image: &IntensityImage, params: &LocalizationParams) -> Result<IrisLocation> {
    let mut tel = LocalizationTelemetry::default();
    pipeline::run_localization(image, params, &mut tel)
}

/// Locate the pupil boundary in one image and report stage telemetry
pub fn locate_with_telemetry(
    image: &IntensityImage,
    params: &LocalizationParams,
) -> (Result<IrisLocation>, LocalizationTelemetry) {
    let mut tel = LocalizationTelemetry::default();
    let result = pipeline::run_localization(image, params, &mut tel);
    (result, tel)
}

/// Localizer holding a parameter set for repeated use
#[derive(Debug, Clone)]
pub struct IrisLocalizer {
    params: LocalizationParams,
}

impl IrisLocalizer {
    /// Create a localizer with the given parameters
    pub fn new(params: LocalizationParams) -> Self {
        Self { params }
    }

    /// Parameters in use
    pub fn params(&self) -> &LocalizationParams {
        &self.params
    }

    /// Locate the pupil boundary in one image
    pub fn locate(&self, image: &IntensityImage) -> Result<IrisLocation> {
        locate_single(image, &self.params)
    }

    /// Locate the pupil boundary in every image, sequentially
    pub fn locate_batch(&self, images: &[IntensityImage]) -> Vec<Result<IrisLocation>> {
        images
            .iter()
            .enumerate()
            .map(|(i, image)| self.locate_logged(i, image))
            .collect()
    }

    /// Locate the pupil boundary in every image on the rayon thread pool
    pub fn locate_batch_parallel(&self, images: &[IntensityImage]) -> Vec<Result<IrisLocation>> {
        images
            .par_iter()
            .enumerate()
            .map(|(i, image)| self.locate_logged(i, image))
            .collect()
    }

    fn locate_logged(&self, index: usize, image: &IntensityImage) -> Result<IrisLocation> {
        let result = self.locate(image);
        if let Err(err) = &result {
            warn!("image {index}: {err}");
        }
        result
    }
}
