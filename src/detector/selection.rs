//! Pick the circle candidate whose center lies closest to the refined
//! centroid.
//!
//! Equal distances fall back to the smaller radius, then to the candidate
//! seen first.

use crate::models::{CircleCandidate, Point};

/// Closest candidate to `target`, or `None` for an empty slice
pub fn select_closest(candidates: &[CircleCandidate], target: Point) -> Option<CircleCandidate> {
    let mut best: Option<(f32, CircleCandidate)> = None;
    for &candidate in candidates {
        let d = candidate.center.distance(&target);
        let better = match best {
            None => true,
            Some((best_d, best_c)) => d < best_d || (d == best_d && candidate.radius < best_c.radius),
        };
        if better {
            best = Some((d, candidate));
        }
    }
    best.map(|(_, c)| c)
}
