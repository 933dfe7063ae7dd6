//! Reliability scores in `[0, 100]`.
//!
//! | Mode                | Score                                                  |
//! |---------------------|--------------------------------------------------------|
//! | geometry            | `100 − 1.5 × maxDeviation − 0.1 × abs(pathLen − inputLen)` |
//! | point observations  | `100 − minDistance − maxDistance`                       |
//!
//! `maxDeviation` is symmetric: the larger of the path's deviation from the
//! input line and the input line's deviation from the path.

use lm_core::geo::max_deviation;
use lm_core::{Point, project_onto_polyline};

const DEVIATION_PENALTY: f64 = 1.5;
const LENGTH_PENALTY: f64 = 0.1;

/// Score how closely `path` follows the input line.
pub fn geometry_reliability(path: &[Point], input: &[Point], path_length: f64, input_length: f64) -> f64 {
    let deviation = max_deviation(path, input).max(max_deviation(input, path));
    let score = 100.0
        - DEVIATION_PENALTY * deviation
        - LENGTH_PENALTY * (path_length - input_length).abs();
    score.clamp(0.0, 100.0)
}

/// Score the distances of `observations` to their closest points on `path`.
pub fn observation_reliability(path: &[Point], observations: &[Point]) -> f64 {
    let (min, max) = observations
        .iter()
        .filter_map(|&p| project_onto_polyline(p, path))
        .map(|p| p.distance)
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if !min.is_finite() {
        return 0.0;
    }
    (100.0 - min - max).clamp(0.0, 100.0)
}

/// Score of one start-to-end candidate route.
pub fn route_score(start: Point, end: Point, path_first: Point, path_last: Point, path_length: f64, expected: f64) -> f64 {
    let score = 100.0
        - start.distance(path_first)
        - end.distance(path_last)
        - LENGTH_PENALTY * (path_length - expected).abs();
    score.max(0.0)
}
