//! Pupil localization stages
//!
//! This module contains the detection logic run on each eye image:
//! - Coarse-to-fine centroid search (minimum-mean rows/columns of a mask)
//! - Search windows around the centroid (clipped or strict)
//! - Edge extraction inside the final window
//! - Circle transform and closest-candidate selection

/// Coarse-to-fine centroid search
pub mod centroid;
/// Hysteresis edge detection
pub mod edges;
/// Gradient-directed circle transform
pub mod hough;
/// Candidate selection by distance to the centroid
pub mod selection;
/// Window extraction around a centroid
pub mod window;
