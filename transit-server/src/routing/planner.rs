//! Query facade over the built graph and router.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::catalogue::Catalogue;

use super::builder::{BuildError, StopVertices, build_route_graph};
use super::graph::{DirectedWeightedGraph, VertexId};
use super::itinerary::{Itinerary, RouteStep};
use super::router::Router;
use super::settings::{RoutingSettings, SettingsError};

/// Errors preparing a planner. Both kinds abort startup: there is no
/// degraded mode with a partial graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    #[error("invalid routing settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// A route query named a stop outside the routed network.
///
/// Per-request: the stop may simply not exist, or exist but be served by
/// no line. Either way the query is answered with "not found" and the
/// process carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stop {0:?} is not part of any bus line")]
pub struct UnknownStop(pub String);

/// Frozen routing state: settings, graph, the all-pairs router, and the
/// stop-name → vertex map.
///
/// Queries take `&self` and never mutate, so one planner can serve any
/// number of threads once built.
#[derive(Debug)]
pub struct Planner {
    settings: RoutingSettings,
    graph: Arc<DirectedWeightedGraph<RouteStep>>,
    router: Router<RouteStep>,
    stop_vertices: BTreeMap<String, StopVertices>,
}

impl Planner {
    /// Validate settings, build the graph, and run the all-pairs
    /// precomputation. This is the expensive step; every query after it
    /// is a table lookup.
    pub fn new(catalogue: &Catalogue, settings: RoutingSettings) -> Result<Self, PlannerError> {
        settings.validate()?;
        let built = build_route_graph(catalogue, &settings)?;
        let router = Router::new(Arc::clone(&built.graph));
        info!(
            vertices = built.graph.vertex_count(),
            edges = built.graph.edge_count(),
            "routing tables ready"
        );
        Ok(Self {
            settings,
            graph: built.graph,
            router,
            stop_vertices: built.stop_vertices,
        })
    }

    /// Reassemble a planner from snapshot parts without rebuilding.
    pub fn from_parts(
        settings: RoutingSettings,
        graph: Arc<DirectedWeightedGraph<RouteStep>>,
        router: Router<RouteStep>,
        stop_vertices: BTreeMap<String, StopVertices>,
    ) -> Self {
        Self {
            settings,
            graph,
            router,
            stop_vertices,
        }
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn graph(&self) -> &DirectedWeightedGraph<RouteStep> {
        &self.graph
    }

    pub fn router(&self) -> &Router<RouteStep> {
        &self.router
    }

    pub fn stop_vertices(&self) -> &BTreeMap<String, StopVertices> {
        &self.stop_vertices
    }

    /// Minimum-time itinerary between two stops.
    ///
    /// `Ok(None)` means both stops are routed but no path connects them.
    pub fn plan(&self, from: &str, to: &str) -> Result<Option<Itinerary>, UnknownStop> {
        let origin = self.arrival_vertex(from)?;
        let destination = self.arrival_vertex(to)?;
        // Safe: both vertices come from this planner's own map.
        let path = self
            .router
            .route(origin, destination)
            .expect("vertices in range");
        Ok(path.map(|path| Itinerary::from_path(&self.graph, &path)))
    }

    /// Queries enter the graph at the arrival side, so the first step of
    /// any itinerary that boards a bus is the origin's wait edge.
    fn arrival_vertex(&self, stop: &str) -> Result<VertexId, UnknownStop> {
        self.stop_vertices
            .get(stop)
            .map(|vertices| vertices.arrival)
            .ok_or_else(|| UnknownStop(stop.to_string()))
    }
}
