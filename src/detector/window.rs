/// Square search window around a centroid estimate
use crate::config::WindowPolicy;
use crate::error::{LocalizationError, Result};
use crate::models::{PointI, Rect};

/// Compute the `size`x`size` window centered on `center` inside a
/// `width`x`height` image.
///
/// The window spans `[c - size/2, c - size/2 + size)` on each axis. With
/// `WindowPolicy::Clip` it is intersected with the image, which always leaves
/// a non-empty rectangle containing `center`. With `WindowPolicy::Strict` a
/// window that does not fit is an `OutOfBounds` error.
pub fn centered_window(
    center: PointI,
    size: usize,
    width: usize,
    height: usize,
    policy: WindowPolicy,
) -> Result<Rect> {
    if center.x >= width || center.y >= height {
        return Err(out_of_bounds(center, size, width, height));
    }

    let half = (size / 2) as isize;
    let x0 = center.x as isize - half;
    let y0 = center.y as isize - half;
    let x1 = x0 + size as isize;
    let y1 = y0 + size as isize;

    let fits = x0 >= 0 && y0 >= 0 && x1 <= width as isize && y1 <= height as isize;
    if fits {
        return Ok(Rect::new(x0 as usize, y0 as usize, size, size));
    }

    match policy {
        WindowPolicy::Strict => Err(out_of_bounds(center, size, width, height)),
        WindowPolicy::Clip => {
            let cx0 = x0.max(0) as usize;
            let cy0 = y0.max(0) as usize;
            let cx1 = (x1.min(width as isize) as usize).max(center.x + 1);
            let cy1 = (y1.min(height as isize) as usize).max(center.y + 1);
            Ok(Rect::new(cx0, cy0, cx1 - cx0, cy1 - cy0))
        }
    }
}

fn out_of_bounds(center: PointI, size: usize, width: usize, height: usize) -> LocalizationError {
    LocalizationError::OutOfBounds {
        x: center.x,
        y: center.y,
        window: size,
        width,
        height,
    }
}
