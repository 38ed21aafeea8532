//! Translation of the catalogue into the routable graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::catalogue::{Catalogue, CatalogueError};
use crate::domain::{LineKind, StopId};

use super::graph::{DirectedWeightedGraph, Edge, GraphError, VertexId};
use super::itinerary::RouteStep;
use super::settings::RoutingSettings;

/// Minutes to cross one meter at one km/h: 60 minutes per hour over
/// 1000 meters per kilometer.
const MINUTES_PER_METER_AT_UNIT_SPEED: f64 = 0.06;

/// Vertex pair assigned to one stop.
///
/// Riders land on `arrival`; the only edge out of it is the wait edge to
/// `departure`, so every boarding pays the wait exactly once and a path
/// that merely passes through a stop never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopVertices {
    pub arrival: VertexId,
    pub departure: VertexId,
}

/// A frozen route graph plus the name → vertex map queries resolve
/// through.
#[derive(Debug)]
pub struct RouteGraph {
    pub graph: Arc<DirectedWeightedGraph<RouteStep>>,
    pub stop_vertices: BTreeMap<String, StopVertices>,
}

/// Errors that abort a build. There is no partial graph: an
/// inconsistency anywhere leaves nothing usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("network is inconsistent: {0}")]
    Catalogue(#[from] CatalogueError),
    #[error("graph construction defect: {0}")]
    Graph(#[from] GraphError),
}

/// Build the routable graph for a catalogue.
///
/// Touched stops get dense vertex pairs in lexicographic name order,
/// then one wait edge each. Every ordered stop pair (i, j) with i < j
/// along a line becomes one ride edge, so any reachable destination of a
/// single ride is one edge and queries never relax along a bus. Linear
/// lines run the pair pass again over the reversed sequence. Settings
/// are validated by the planner before building.
pub fn build_route_graph(
    catalogue: &Catalogue,
    settings: &RoutingSettings,
) -> Result<RouteGraph, BuildError> {
    let mut stop_vertices = BTreeMap::new();
    let mut next_vertex = 0usize;
    for (name, _) in catalogue.touched_stops() {
        stop_vertices.insert(
            name.to_string(),
            StopVertices {
                arrival: VertexId(next_vertex),
                departure: VertexId(next_vertex + 1),
            },
        );
        next_vertex += 2;
    }

    let mut graph = DirectedWeightedGraph::new(next_vertex);

    for (name, vertices) in &stop_vertices {
        graph.add_edge(Edge {
            from: vertices.arrival,
            to: vertices.departure,
            weight: RouteStep::Wait {
                stop: Arc::from(name.as_str()),
                minutes: settings.bus_wait_time,
            },
        })?;
    }

    for line in catalogue.bus_lines() {
        let bus: Arc<str> = Arc::from(line.name.as_str());
        add_ride_edges(&mut graph, catalogue, settings, &stop_vertices, &bus, &line.stops)?;
        if line.kind == LineKind::Linear {
            let reversed: Vec<StopId> = line.stops.iter().rev().copied().collect();
            add_ride_edges(&mut graph, catalogue, settings, &stop_vertices, &bus, &reversed)?;
        }
    }

    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "route graph built"
    );

    Ok(RouteGraph {
        graph: Arc::new(graph),
        stop_vertices,
    })
}

/// One ride edge per ordered pair of positions in `stops`, with the
/// cumulative duration carried forward so the pass stays quadratic.
fn add_ride_edges(
    graph: &mut DirectedWeightedGraph<RouteStep>,
    catalogue: &Catalogue,
    settings: &RoutingSettings,
    stop_vertices: &BTreeMap<String, StopVertices>,
    bus: &Arc<str>,
    stops: &[StopId],
) -> Result<(), BuildError> {
    // Every stop on a line is touched, so the map always has an entry.
    let vertices = |stop: StopId| stop_vertices[catalogue.stop(stop).name.as_str()];

    for start in 0..stops.len() {
        let mut minutes = 0.0;
        for end in start + 1..stops.len() {
            let leg = catalogue.distance(stops[end - 1], stops[end])?;
            minutes += leg / settings.bus_velocity * MINUTES_PER_METER_AT_UNIT_SPEED;
            graph.add_edge(Edge {
                from: vertices(stops[start]).departure,
                to: vertices(stops[end]).arrival,
                weight: RouteStep::Ride {
                    bus: Arc::clone(bus),
                    span: (end - start) as u32,
                    minutes,
                },
            })?;
        }
    }
    Ok(())
}
