//! Itinerary steps and assembly from found paths.

use std::sync::Arc;

use super::graph::DirectedWeightedGraph;
use super::router::{EdgeCost, RoutePath};

/// One rider-visible action, and also the graph's edge weight: every
/// edge is exactly one step, so reading a path off its edges needs no
/// interpretation beyond cloning the labels.
///
/// Names are shared `Arc<str>` handles; a line with n stops produces
/// O(n²) ride edges that all label the same bus.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteStep {
    /// Wait at `stop` for the fixed boarding time.
    Wait { stop: Arc<str>, minutes: f64 },
    /// Stay aboard `bus` for `span` consecutive stops.
    Ride {
        bus: Arc<str>,
        span: u32,
        minutes: f64,
    },
}

impl RouteStep {
    pub fn minutes(&self) -> f64 {
        match self {
            RouteStep::Wait { minutes, .. } | RouteStep::Ride { minutes, .. } => *minutes,
        }
    }
}

impl EdgeCost for RouteStep {
    fn cost(&self) -> f64 {
        self.minutes()
    }
}

/// A complete answer to a route query.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Total travel time in minutes; the sum of every step's duration.
    pub total_minutes: f64,
    /// Steps in travel order, alternating waits and rides.
    pub steps: Vec<RouteStep>,
}

impl Itinerary {
    /// Read the steps of a found path off its edges, in order.
    pub fn from_path(graph: &DirectedWeightedGraph<RouteStep>, path: &RoutePath) -> Self {
        let steps = path
            .edges
            .iter()
            .map(|&id| {
                // Safe: path edges come from the router built over this graph.
                graph.edge(id).expect("path edge id").weight.clone()
            })
            .collect();
        Self {
            total_minutes: path.total,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::graph::{Edge, EdgeId, VertexId};

    fn wait(stop: &str, minutes: f64) -> RouteStep {
        RouteStep::Wait {
            stop: Arc::from(stop),
            minutes,
        }
    }

    fn ride(bus: &str, span: u32, minutes: f64) -> RouteStep {
        RouteStep::Ride {
            bus: Arc::from(bus),
            span,
            minutes,
        }
    }

    #[test]
    fn cost_is_duration_for_both_kinds() {
        assert_eq!(wait("A", 6.0).cost(), 6.0);
        assert_eq!(ride("1", 2, 3.5).cost(), 3.5);
    }

    #[test]
    fn from_path_reads_steps_in_edge_order() {
        let mut graph = DirectedWeightedGraph::new(3);
        graph
            .add_edge(Edge {
                from: VertexId(0),
                to: VertexId(1),
                weight: wait("A", 6.0),
            })
            .unwrap();
        graph
            .add_edge(Edge {
                from: VertexId(1),
                to: VertexId(2),
                weight: ride("1", 1, 1.0),
            })
            .unwrap();

        let path = RoutePath {
            total: 7.0,
            edges: vec![EdgeId(0), EdgeId(1)],
        };
        let itinerary = Itinerary::from_path(&graph, &path);

        assert_eq!(itinerary.total_minutes, 7.0);
        assert_eq!(itinerary.steps, vec![wait("A", 6.0), ride("1", 1, 1.0)]);
    }

    #[test]
    fn empty_path_is_an_empty_itinerary() {
        let graph: DirectedWeightedGraph<RouteStep> = DirectedWeightedGraph::new(1);
        let itinerary = Itinerary::from_path(
            &graph,
            &RoutePath {
                total: 0.0,
                edges: Vec::new(),
            },
        );
        assert_eq!(itinerary.total_minutes, 0.0);
        assert!(itinerary.steps.is_empty());
    }
}
