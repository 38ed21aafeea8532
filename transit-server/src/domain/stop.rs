//! Stop types.

use geo::Point;

/// Stable handle to a stop in the catalogue's arena.
///
/// Bus lines and the distance table reference stops through `StopId`
/// rather than names or pointers, so the catalogue can keep growing
/// without invalidating anything already declared.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StopId;
///
/// let id = StopId(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

impl StopId {
    /// Position of this stop in the catalogue's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named location on the transit network.
///
/// Coordinates feed the curvature statistic only; routing costs always
/// come from declared road distances, never from geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Unique stop name.
    pub name: String,
    /// Geographic position; x is longitude, y is latitude.
    pub location: Point<f64>,
}

impl Stop {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            location: Point::new(longitude, latitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_round_trip() {
        let stop = Stop::new("Marushkino", 55.595884, 37.209755);
        assert_eq!(stop.name, "Marushkino");
        assert_eq!(stop.latitude(), 55.595884);
        assert_eq!(stop.longitude(), 37.209755);
    }

    #[test]
    fn stop_id_ordering_follows_index() {
        assert!(StopId(0) < StopId(1));
        assert_eq!(StopId(7).index(), 7);
    }
}
