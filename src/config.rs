//! Localization parameters.
//!
//! The five options of the public entry point have no defaults; the
//! remaining knobs (window size, refinement count, smoothing, radius range,
//! vote threshold, window policy) default to values tuned for ~320x280 eye
//! images and can be overridden through `IRIS_*` environment variables.

use crate::error::{LocalizationError, Result};
use crate::utils::bilateral::BilateralParams;

/// Side length of the square refinement window
pub const DEFAULT_WINDOW_SIZE: usize = 120;
/// Number of window re-centering passes
pub const DEFAULT_REFINE_ITERATIONS: usize = 2;
/// Smallest circle radius searched by the circle transform
pub const DEFAULT_MIN_RADIUS: usize = 5;
/// Accumulator votes (and edge support) a circle needs
pub const DEFAULT_HOUGH_VOTE_THRESHOLD: u32 = 12;

/// What to do when the refinement window leaves the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Intersect the window with the image bounds
    #[default]
    Clip,
    /// Fail with `OutOfBounds`
    Strict,
}

/// Full parameter set for one localization pass
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationParams {
    /// Hysteresis low threshold, in Sobel gradient units
    pub edge_threshold_low: f32,
    /// Hysteresis high threshold, in Sobel gradient units
    pub edge_threshold_high: f32,
    /// Inverse ratio of image resolution to accumulator resolution
    pub hough_resolution: f32,
    /// Minimum distance between detected circle centers, in pixels
    pub hough_min_distance: f32,
    /// Intensity cutoff; pixels at or below it are pupil candidates
    pub binarize_threshold: u8,
    /// Side length of the refinement window
    pub window_size: usize,
    /// Number of refinement passes
    pub refine_iterations: usize,
    /// Pre-binarization smoothing
    pub smoothing: BilateralParams,
    /// Smallest radius searched
    pub min_radius: usize,
    /// Largest radius searched; `None` means half the window
    pub max_radius: Option<usize>,
    /// Votes a center needs, also the edge support a radius needs
    pub hough_vote_threshold: u32,
    /// Handling of windows that leave the image
    pub window_policy: WindowPolicy,
}

impl LocalizationParams {
    /// Create a parameter set from the five public options
    pub fn new(
        edge_threshold_low: f32,
        edge_threshold_high: f32,
        hough_resolution: f32,
        hough_min_distance: f32,
        binarize_threshold: u8,
    ) -> Self {
        Self {
            edge_threshold_low,
            edge_threshold_high,
            hough_resolution,
            hough_min_distance,
            binarize_threshold,
            window_size: DEFAULT_WINDOW_SIZE,
            refine_iterations: DEFAULT_REFINE_ITERATIONS,
            smoothing: BilateralParams::default(),
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: None,
            hough_vote_threshold: DEFAULT_HOUGH_VOTE_THRESHOLD,
            window_policy: WindowPolicy::Clip,
        }
    }

    /// Set the refinement window side length
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the number of refinement passes
    pub fn with_refine_iterations(mut self, iterations: usize) -> Self {
        self.refine_iterations = iterations;
        self
    }

    /// Set the smoothing parameters
    pub fn with_smoothing(mut self, smoothing: BilateralParams) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the searched radius range
    pub fn with_radius_range(mut self, min_radius: usize, max_radius: usize) -> Self {
        self.min_radius = min_radius;
        self.max_radius = Some(max_radius);
        self
    }

    /// Set the accumulator vote threshold
    pub fn with_hough_vote_threshold(mut self, votes: u32) -> Self {
        self.hough_vote_threshold = votes;
        self
    }

    /// Set the window policy
    pub fn with_window_policy(mut self, policy: WindowPolicy) -> Self {
        self.window_policy = policy;
        self
    }

    /// Largest radius searched after applying the window default.
    ///
    /// The refined centroid can sit several pixels off the true center, so
    /// a pupil with a radius close to `window_size / 2` loses part of its
    /// boundary to the window edge. The circle fit recovers it from the
    /// remaining arc; validation caps the value at `window_size`.
    pub fn effective_max_radius(&self) -> usize {
        self.max_radius.unwrap_or(self.window_size / 2)
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.edge_threshold_low.is_finite() || self.edge_threshold_low < 0.0 {
            return Err(LocalizationError::invalid(
                "edge_threshold_low",
                format!("must be finite and >= 0, got {}", self.edge_threshold_low),
            ));
        }
        if !self.edge_threshold_high.is_finite() || self.edge_threshold_high < 0.0 {
            return Err(LocalizationError::invalid(
                "edge_threshold_high",
                format!("must be finite and >= 0, got {}", self.edge_threshold_high),
            ));
        }
        if !self.hough_resolution.is_finite() || self.hough_resolution < 1.0 {
            return Err(LocalizationError::invalid(
                "hough_resolution",
                format!("must be finite and >= 1, got {}", self.hough_resolution),
            ));
        }
        if !self.hough_min_distance.is_finite() || self.hough_min_distance <= 0.0 {
            return Err(LocalizationError::invalid(
                "hough_min_distance",
                format!("must be finite and > 0, got {}", self.hough_min_distance),
            ));
        }
        if self.window_size < 3 {
            return Err(LocalizationError::invalid(
                "window_size",
                format!("must be at least 3, got {}", self.window_size),
            ));
        }
        if self.smoothing.diameter == 0 {
            return Err(LocalizationError::invalid(
                "smoothing.diameter",
                "must be positive",
            ));
        }
        if !(self.smoothing.sigma_color > 0.0 && self.smoothing.sigma_space > 0.0) {
            return Err(LocalizationError::invalid(
                "smoothing",
                "sigmas must be positive",
            ));
        }
        let max_radius = self.effective_max_radius();
        if max_radius > self.window_size {
            return Err(LocalizationError::invalid(
                "max_radius",
                format!(
                    "must not exceed the window size {}, got {max_radius}",
                    self.window_size
                ),
            ));
        }
        if self.min_radius == 0 || self.min_radius > max_radius {
            return Err(LocalizationError::invalid(
                "min_radius",
                format!(
                    "must be in 1..={max_radius}, got {}",
                    self.min_radius
                ),
            ));
        }
        if self.hough_vote_threshold == 0 {
            return Err(LocalizationError::invalid(
                "hough_vote_threshold",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Apply `IRIS_*` environment overrides; unset or unparsable variables
    /// leave the current value alone
    pub fn with_env_overrides(mut self) -> Self {
        self.window_size = parse_env_usize("IRIS_WINDOW_SIZE", self.window_size);
        self.refine_iterations = parse_env_usize("IRIS_REFINE_ITERATIONS", self.refine_iterations);
        self.min_radius = parse_env_usize("IRIS_MIN_RADIUS", self.min_radius);
        if let Some(max) = env_value("IRIS_MAX_RADIUS").and_then(|v| v.parse::<usize>().ok()) {
            self.max_radius = Some(max);
        }
        self.hough_vote_threshold = parse_env_u32("IRIS_HOUGH_VOTES", self.hough_vote_threshold);
        if let Some(policy) = env_value("IRIS_WINDOW_POLICY").and_then(|v| parse_policy(&v)) {
            self.window_policy = policy;
        }
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string())
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    env_value(name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    env_value(name)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_policy(value: &str) -> Option<WindowPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "clip" => Some(WindowPolicy::Clip),
        "strict" => Some(WindowPolicy::Strict),
        _ => None,
    }
}
