//! Itinerary routing over the bus network.
//!
//! This module answers: "starting at stop A, what is the fastest way to
//! reach stop B, counting waiting time at every boarding?"
//!
//! The catalogue is compiled into a time-weighted directed graph (two
//! vertices per served stop, wait and ride edges), an all-pairs router
//! precomputes minimum totals over that graph, and queries reconstruct
//! step-by-step itineraries from the router's tables.

mod builder;
mod graph;
mod itinerary;
mod planner;
mod router;
mod settings;

pub use builder::{BuildError, RouteGraph, StopVertices, build_route_graph};
pub use graph::{DirectedWeightedGraph, Edge, EdgeId, GraphError, VertexId};
pub use itinerary::{Itinerary, RouteStep};
pub use planner::{Planner, PlannerError, UnknownStop};
pub use router::{EdgeCost, PathEntry, RoutePath, Router};
pub use settings::{RoutingSettings, SettingsError};
