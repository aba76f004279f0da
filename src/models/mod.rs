pub mod circle;
pub mod intensity;
pub mod mask;
pub mod point;

pub use circle::{CircleCandidate, IrisLocation};
pub use intensity::IntensityImage;
pub use mask::BinaryMask;
pub use point::{Point, PointI, Rect};
