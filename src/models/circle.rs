use crate::models::Point;

/// Circle proposed by the circle transform, in the coordinates of the image
/// it was detected in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCandidate {
    /// Circle center
    pub center: Point,
    /// Circle radius in pixels
    pub radius: f32,
    /// Accumulator votes at the center cell
    pub votes: u32,
}

impl CircleCandidate {
    /// Create a new candidate
    pub fn new(x: f32, y: f32, radius: f32, votes: u32) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
            votes,
        }
    }
}

/// Final pupil boundary for one image, in full-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrisLocation {
    /// Center column
    pub center_x: i32,
    /// Center row
    pub center_y: i32,
    /// Radius in pixels
    pub radius: i32,
}

impl IrisLocation {
    /// Create a new location
    pub fn new(center_x: i32, center_y: i32, radius: i32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// `(center_x, center_y, radius)` tuple
    pub fn as_tuple(&self) -> (i32, i32, i32) {
        (self.center_x, self.center_y, self.radius)
    }
}
