//! Bus line types.

use std::collections::HashSet;

use super::StopId;

/// Stable handle to a bus line in the catalogue's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusId(pub u32);

impl BusId {
    /// Position of this line in the catalogue's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a line's stored stop sequence is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The sequence forms a closed loop, traversed once forward.
    Circular,
    /// The sequence is traversed forward, then mirrored backward.
    Linear,
}

/// A named bus line: an ordered stop sequence plus its traversal kind.
///
/// The sequence is stored exactly as declared. A circular line's closing
/// stop, if the document repeats it, stays in the sequence; a linear
/// line's return leg is never stored and is derived where needed.
#[derive(Debug, Clone, PartialEq)]
pub struct BusLine {
    /// Unique line name.
    pub name: String,
    pub kind: LineKind,
    pub stops: Vec<StopId>,
}

impl BusLine {
    /// Number of stops a rider passes riding the line end to end.
    ///
    /// A linear line is ridden out and back, so every stop except the
    /// turnaround is passed twice.
    pub fn stops_on_route(&self) -> usize {
        match self.kind {
            LineKind::Circular => self.stops.len(),
            LineKind::Linear => match self.stops.len() {
                0 => 0,
                n => 2 * n - 1,
            },
        }
    }

    /// Distinct stops in the declared sequence.
    pub fn unique_stop_count(&self) -> usize {
        self.stops.iter().collect::<HashSet<_>>().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: LineKind, stops: &[u32]) -> BusLine {
        BusLine {
            name: "256".to_string(),
            kind,
            stops: stops.iter().map(|&i| StopId(i)).collect(),
        }
    }

    #[test]
    fn circular_counts_stored_sequence() {
        let bus = line(LineKind::Circular, &[0, 1, 2, 0]);
        assert_eq!(bus.stops_on_route(), 4);
        assert_eq!(bus.unique_stop_count(), 3);
    }

    #[test]
    fn linear_counts_both_directions() {
        let bus = line(LineKind::Linear, &[0, 1, 2]);
        assert_eq!(bus.stops_on_route(), 5);
        assert_eq!(bus.unique_stop_count(), 3);
    }

    #[test]
    fn empty_line_has_no_stops() {
        let bus = line(LineKind::Linear, &[]);
        assert_eq!(bus.stops_on_route(), 0);
        assert_eq!(bus.unique_stop_count(), 0);
    }
}
