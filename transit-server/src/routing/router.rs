//! All-pairs shortest paths over a frozen graph.

use std::sync::Arc;

use super::graph::{DirectedWeightedGraph, EdgeId, GraphError, VertexId};

/// Scalar, additive cost of an edge. Costs must be non-negative.
pub trait EdgeCost {
    fn cost(&self) -> f64;
}

impl EdgeCost for f64 {
    fn cost(&self) -> f64 {
        *self
    }
}

/// One cell of the path table: the best known total from some origin,
/// plus the final edge of a path achieving it. `prev_edge` is `None`
/// exactly on the diagonal (a vertex reaching itself).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEntry {
    pub total: f64,
    pub prev_edge: Option<EdgeId>,
}

/// A found path: summed edge cost and the edge ids in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub total: f64,
    pub edges: Vec<EdgeId>,
}

/// Precomputed minimum-cost paths for every ordered vertex pair.
///
/// Construction runs one relaxation pass, cubic in the vertex count;
/// `route` afterwards is a table lookup plus a walk along the recorded
/// predecessor chain. Construction never fails: unreachable pairs simply
/// hold no entry. Relaxation only ever replaces an entry for a strictly
/// smaller total, so equal-cost alternatives resolve the same way on
/// every run over the same graph.
#[derive(Debug)]
pub struct Router<W> {
    graph: Arc<DirectedWeightedGraph<W>>,
    table: Vec<Vec<Option<PathEntry>>>,
}

impl<W: EdgeCost> Router<W> {
    pub fn new(graph: Arc<DirectedWeightedGraph<W>>) -> Self {
        let n = graph.vertex_count();
        let mut table = vec![vec![None; n]; n];

        for u in 0..n {
            table[u][u] = Some(PathEntry {
                total: 0.0,
                prev_edge: None,
            });
        }
        for (index, edge) in graph.edges().iter().enumerate() {
            let total = edge.weight.cost();
            let cell = &mut table[edge.from.0][edge.to.0];
            let better = match cell {
                None => true,
                Some(existing) => total < existing.total,
            };
            if better {
                *cell = Some(PathEntry {
                    total,
                    prev_edge: Some(EdgeId(index)),
                });
            }
        }

        for through in 0..n {
            // Entries in the through row cannot improve during their own
            // round (that would need a shorter path through `through`
            // back to itself), so a copy stays valid for the whole round.
            let through_row = table[through].clone();
            for u in 0..n {
                let Some(first) = table[u][through] else {
                    continue;
                };
                for w in 0..n {
                    let Some(second) = through_row[w] else {
                        continue;
                    };
                    let total = first.total + second.total;
                    let cell = &mut table[u][w];
                    let better = match cell {
                        None => true,
                        Some(existing) => total < existing.total,
                    };
                    if better {
                        *cell = Some(PathEntry {
                            total,
                            prev_edge: second.prev_edge,
                        });
                    }
                }
            }
        }

        Self { graph, table }
    }

    /// Reassemble a router from a snapshot's table without re-running
    /// the all-pairs computation.
    pub fn from_parts(
        graph: Arc<DirectedWeightedGraph<W>>,
        table: Vec<Vec<Option<PathEntry>>>,
    ) -> Self {
        Self { graph, table }
    }

    /// Minimum-cost path from `from` to `to`, if one exists.
    pub fn route(&self, from: VertexId, to: VertexId) -> Result<Option<RoutePath>, GraphError> {
        let vertices = self.table.len();
        for v in [from, to] {
            if v.0 >= vertices {
                return Err(GraphError::VertexOutOfRange { vertex: v.0, vertices });
            }
        }
        let Some(entry) = self.table[from.0][to.0] else {
            return Ok(None);
        };

        let mut edges = Vec::new();
        let mut prev = entry.prev_edge;
        while let Some(id) = prev {
            edges.push(id);
            // Safe: the table only holds edge ids issued by this graph,
            // and every recorded path's prefix is itself recorded.
            let edge = self.graph.edge(id).expect("edge id from own table");
            prev = self.table[from.0][edge.from.0]
                .expect("path prefix recorded")
                .prev_edge;
        }
        edges.reverse();

        Ok(Some(RoutePath {
            total: entry.total,
            edges,
        }))
    }

    pub fn vertex_count(&self) -> usize {
        self.table.len()
    }

    pub fn graph(&self) -> &DirectedWeightedGraph<W> {
        &self.graph
    }

    /// The full path table, for persistence.
    pub fn entries(&self) -> &[Vec<Option<PathEntry>>] {
        &self.table
    }
}
