//! Error type shared by every localization stage.

use thiserror::Error;

/// Errors produced while localizing the iris in a single image.
///
/// Errors are per-image: batch entry points report one `Result` per input
/// and never abort the remaining images.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalizationError {
    /// Input image is empty, has an unsupported channel layout, a buffer of
    /// the wrong size, or non-finite samples.
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// A localization parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as exposed by `LocalizationParams`.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The refinement window centered on the estimate leaves the image and the
    /// window policy is strict.
    #[error(
        "{window}x{window} window centered at ({x}, {y}) exceeds image bounds {width}x{height}"
    )]
    OutOfBounds {
        /// Centroid x at the time of extraction.
        x: usize,
        /// Centroid y at the time of extraction.
        y: usize,
        /// Requested window side length.
        window: usize,
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
    },

    /// The circle transform produced no candidates.
    #[error("no circle detected ({edge_pixels} edge pixels in search window)")]
    NoCircleDetected {
        /// Number of edge pixels the transform had to work with.
        edge_pixels: usize,
    },
}

impl LocalizationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LocalizationError>;
