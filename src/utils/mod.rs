//! Utility functions for image processing
//!
//! This module provides the pixel-level building blocks of localization:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Bilateral smoothing (edge-preserving noise suppression)
//! - Binarization (global threshold, dark pixels as foreground)
//! - Row/column profiles of binarized images

pub mod bilateral;
pub mod binarization;
pub mod grayscale;
pub mod profile;
