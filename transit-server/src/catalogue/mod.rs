//! The transit catalogue: owning store for stops, bus lines, and road
//! distances, plus the per-line statistics derived from them.

mod distance;

pub use distance::DistanceIndex;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{BusId, BusLine, LineKind, Stop, StopId, haversine_meters};

/// Errors from catalogue declarations and lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogueError {
    #[error("stop {0:?} is not declared")]
    UnknownStop(String),
    #[error("bus {0:?} is not declared")]
    UnknownBus(String),
    #[error("stop {0:?} is already declared")]
    DuplicateStop(String),
    #[error("bus {0:?} is already declared")]
    DuplicateBus(String),
    #[error("no road distance declared between {from:?} and {to:?}")]
    UndeclaredDistance { from: String, to: String },
}

/// Aggregate statistics for one bus line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSummary {
    /// Stops passed riding the line end to end.
    pub stop_count: usize,
    /// Distinct stops in the sequence.
    pub unique_stop_count: usize,
    /// Declared road length of the full route, meters.
    pub length_meters: f64,
    /// Road length divided by the great-circle length.
    pub curvature: f64,
}

/// Owning arena for the transit network.
///
/// Stops and buses are stored once and addressed by `StopId`/`BusId`.
/// The name maps are ordered, so every iteration that feeds vertex or
/// edge assignment downstream is lexicographic and rebuilding the same
/// catalogue reproduces the same graph.
#[derive(Debug, Default)]
pub struct Catalogue {
    stops: Vec<Stop>,
    buses: Vec<BusLine>,
    stop_names: BTreeMap<String, StopId>,
    bus_names: BTreeMap<String, BusId>,
    distances: DistanceIndex,
    /// Names of the lines serving each stop, kept sorted for output.
    serving: HashMap<StopId, BTreeSet<String>>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a stop. Names are unique.
    pub fn add_stop(
        &mut self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<StopId, CatalogueError> {
        if self.stop_names.contains_key(name) {
            return Err(CatalogueError::DuplicateStop(name.to_string()));
        }
        let id = StopId(self.stops.len() as u32);
        self.stops.push(Stop::new(name, latitude, longitude));
        self.stop_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare (or overwrite) the directional road distance between two
    /// already-declared stops.
    pub fn set_distance(&mut self, from: &str, to: &str, meters: f64) -> Result<(), CatalogueError> {
        let from = self.stop_id(from)?;
        let to = self.stop_id(to)?;
        self.distances.set(from, to, meters);
        Ok(())
    }

    /// Declare a bus line over already-declared stops.
    pub fn add_bus(
        &mut self,
        name: &str,
        stop_names: &[impl AsRef<str>],
        kind: LineKind,
    ) -> Result<BusId, CatalogueError> {
        if self.bus_names.contains_key(name) {
            return Err(CatalogueError::DuplicateBus(name.to_string()));
        }
        let stops = stop_names
            .iter()
            .map(|stop| self.stop_id(stop.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let id = BusId(self.buses.len() as u32);
        for &stop in &stops {
            self.serving.entry(stop).or_default().insert(name.to_string());
        }
        self.buses.push(BusLine {
            name: name.to_string(),
            kind,
            stops,
        });
        self.bus_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn stop_id(&self, name: &str) -> Result<StopId, CatalogueError> {
        self.stop_names
            .get(name)
            .copied()
            .ok_or_else(|| CatalogueError::UnknownStop(name.to_string()))
    }

    pub fn bus_id(&self, name: &str) -> Result<BusId, CatalogueError> {
        self.bus_names
            .get(name)
            .copied()
            .ok_or_else(|| CatalogueError::UnknownBus(name.to_string()))
    }

    /// Stop by id. Ids are issued by this catalogue and always valid.
    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.index()]
    }

    /// Bus line by id. Ids are issued by this catalogue and always valid.
    pub fn bus(&self, id: BusId) -> &BusLine {
        &self.buses[id.index()]
    }

    /// Every stop, in declaration (id) order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Every bus line, in declaration (id) order.
    pub fn buses(&self) -> &[BusLine] {
        &self.buses
    }

    /// The declared distance table.
    pub fn distances(&self) -> &DistanceIndex {
        &self.distances
    }

    /// Stops referenced by at least one bus line, lexicographic by name.
    pub fn touched_stops(&self) -> impl Iterator<Item = (&str, StopId)> + '_ {
        self.stop_names
            .iter()
            .filter(|(_, id)| self.serving.contains_key(id))
            .map(|(name, &id)| (name.as_str(), id))
    }

    /// Bus lines in lexicographic name order.
    pub fn bus_lines(&self) -> impl Iterator<Item = &BusLine> + '_ {
        self.bus_names.values().map(|id| &self.buses[id.index()])
    }

    /// Road distance for an ordered stop pair, with the reverse-entry
    /// fallback. Missing in both directions is an error: the network's
    /// topology is inconsistent and no usable duration exists.
    pub fn distance(&self, from: StopId, to: StopId) -> Result<f64, CatalogueError> {
        self.distances
            .get(from, to)
            .ok_or_else(|| CatalogueError::UndeclaredDistance {
                from: self.stop(from).name.clone(),
                to: self.stop(to).name.clone(),
            })
    }

    /// Names of the buses serving a stop, sorted.
    ///
    /// An unknown stop is an error; a known stop no line serves yields an
    /// empty list, and callers distinguish the two.
    pub fn buses_at(&self, stop_name: &str) -> Result<Vec<&str>, CatalogueError> {
        let id = self.stop_id(stop_name)?;
        Ok(self
            .serving
            .get(&id)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default())
    }

    /// Aggregate statistics for a named line.
    pub fn line_summary(&self, name: &str) -> Result<LineSummary, CatalogueError> {
        let line = self.bus(self.bus_id(name)?);

        let mut road = 0.0;
        let mut straight = 0.0;
        for pair in line.stops.windows(2) {
            road += self.distance(pair[0], pair[1])?;
            if line.kind == LineKind::Linear {
                road += self.distance(pair[1], pair[0])?;
            }
            straight += haversine_meters(self.stop(pair[0]).location, self.stop(pair[1]).location);
        }
        if line.kind == LineKind::Linear {
            straight *= 2.0;
        }

        // A line with fewer than two stops has no geometry to compare against.
        let curvature = if straight > 0.0 { road / straight } else { 1.0 };

        Ok(LineSummary {
            stop_count: line.stops_on_route(),
            unique_stop_count: line.unique_stop_count(),
            length_meters: road,
            curvature,
        })
    }
}
