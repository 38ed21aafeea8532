//! Great-circle helpers.

use geo::{HaversineDistance, Point};

/// Great-circle distance between two points, in meters.
///
/// Used only for the curvature statistic (how much longer the road is
/// than the straight line); routing never consumes this.
pub fn haversine_meters(a: Point<f64>, b: Point<f64>) -> f64 {
    a.haversine_distance(&b)
}
