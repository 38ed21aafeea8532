//! Pairwise road distances between stops.

use std::collections::HashMap;

use crate::domain::StopId;

/// Directional road-distance table with one-level reverse fallback.
///
/// Distances are declared per ordered stop pair and need not be
/// symmetric: a dual carriageway can be longer one way than the other.
/// Lookup prefers the queried direction and falls back to the reverse
/// entry, so a dataset only has to declare one direction when both are
/// equal. Nothing beyond that single fallback is ever assumed.
///
/// # Examples
///
/// ```
/// use transit_server::catalogue::DistanceIndex;
/// use transit_server::domain::StopId;
///
/// let mut index = DistanceIndex::new();
/// index.set(StopId(0), StopId(1), 1200.0);
///
/// assert_eq!(index.get(StopId(0), StopId(1)), Some(1200.0));
/// // The reverse direction falls back to the declared entry.
/// assert_eq!(index.get(StopId(1), StopId(0)), Some(1200.0));
/// assert_eq!(index.get(StopId(0), StopId(2)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistanceIndex {
    meters: HashMap<(StopId, StopId), f64>,
}

impl DistanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or overwrite) the road distance for an ordered pair.
    pub fn set(&mut self, from: StopId, to: StopId, meters: f64) {
        self.meters.insert((from, to), meters);
    }

    /// Distance for (from, to), falling back to the (to, from) entry.
    ///
    /// `None` means neither direction was declared; callers report that
    /// with stop names attached.
    pub fn get(&self, from: StopId, to: StopId) -> Option<f64> {
        self.meters
            .get(&(from, to))
            .or_else(|| self.meters.get(&(to, from)))
            .copied()
    }

    /// Every declared entry, exactly as declared (no fallback applied).
    pub fn declared(&self) -> impl Iterator<Item = (StopId, StopId, f64)> + '_ {
        self.meters.iter().map(|(&(from, to), &meters)| (from, to, meters))
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}
