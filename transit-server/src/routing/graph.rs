//! Generic weighted directed graph.

/// Vertex handle: dense ids `0..vertex_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Edge handle, assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// A directed edge with an arbitrary weight payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<W> {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: W,
}

/// An id outside the graph's constructed range. Ids are only produced by
/// the graph itself, so hitting this means a caller mixed up graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("vertex {vertex} out of range for a graph with {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },
    #[error("edge {edge} out of range for a graph with {edges} edges")]
    EdgeOutOfRange { edge: usize, edges: usize },
}

/// Append-only directed graph with per-vertex outgoing-edge lists.
///
/// The vertex count is fixed at construction. Edges accumulate while the
/// builder runs and the graph is frozen before any router consumes it;
/// nothing is ever removed, so edge ids stay stable and double as output
/// ordering.
#[derive(Debug, Clone)]
pub struct DirectedWeightedGraph<W> {
    edges: Vec<Edge<W>>,
    incidence: Vec<Vec<EdgeId>>,
}

impl<W> DirectedWeightedGraph<W> {
    /// An empty graph over `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence: vec![Vec::new(); vertex_count],
        }
    }

    /// Reassemble a graph from persisted parts.
    ///
    /// The incidence lists must describe the edge list; snapshot loading
    /// restores both from the same capture.
    pub fn from_parts(edges: Vec<Edge<W>>, incidence: Vec<Vec<EdgeId>>) -> Self {
        Self { edges, incidence }
    }

    /// Append an edge, returning its id.
    pub fn add_edge(&mut self, edge: Edge<W>) -> Result<EdgeId, GraphError> {
        let vertices = self.vertex_count();
        for v in [edge.from, edge.to] {
            if v.0 >= vertices {
                return Err(GraphError::VertexOutOfRange { vertex: v.0, vertices });
            }
        }
        let id = EdgeId(self.edges.len());
        self.incidence[edge.from.0].push(id);
        self.edges.push(edge);
        Ok(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Stored edge by id.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge<W>, GraphError> {
        self.edges.get(id.0).ok_or(GraphError::EdgeOutOfRange {
            edge: id.0,
            edges: self.edges.len(),
        })
    }

    /// Outgoing edge ids of `vertex`, in insertion order.
    pub fn incident_edges(&self, vertex: VertexId) -> Result<&[EdgeId], GraphError> {
        self.incidence
            .get(vertex.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::VertexOutOfRange {
                vertex: vertex.0,
                vertices: self.incidence.len(),
            })
    }

    /// Every edge in insertion order.
    pub fn edges(&self) -> &[Edge<W>] {
        &self.edges
    }

    /// Every incidence list in vertex order.
    pub fn incidence_lists(&self) -> &[Vec<EdgeId>] {
        &self.incidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: usize, to: usize, weight: f64) -> Edge<f64> {
        Edge {
            from: VertexId(from),
            to: VertexId(to),
            weight,
        }
    }

    #[test]
    fn edge_ids_follow_insertion_order() {
        let mut graph = DirectedWeightedGraph::new(3);
        assert_eq!(graph.add_edge(edge(0, 1, 1.0)), Ok(EdgeId(0)));
        assert_eq!(graph.add_edge(edge(1, 2, 2.0)), Ok(EdgeId(1)));
        assert_eq!(graph.add_edge(edge(0, 2, 3.0)), Ok(EdgeId(2)));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn stored_edges_read_back() {
        let mut graph = DirectedWeightedGraph::new(2);
        let id = graph.add_edge(edge(0, 1, 4.5)).unwrap();

        let stored = graph.edge(id).unwrap();
        assert_eq!(stored.from, VertexId(0));
        assert_eq!(stored.to, VertexId(1));
        assert_eq!(stored.weight, 4.5);
    }

    #[test]
    fn incident_edges_keep_insertion_order_per_vertex() {
        let mut graph = DirectedWeightedGraph::new(3);
        graph.add_edge(edge(0, 1, 1.0)).unwrap();
        graph.add_edge(edge(1, 2, 1.0)).unwrap();
        graph.add_edge(edge(0, 2, 1.0)).unwrap();

        assert_eq!(graph.incident_edges(VertexId(0)).unwrap(), &[EdgeId(0), EdgeId(2)]);
        assert_eq!(graph.incident_edges(VertexId(1)).unwrap(), &[EdgeId(1)]);
        assert_eq!(graph.incident_edges(VertexId(2)).unwrap(), &[]);
    }

    #[test]
    fn out_of_range_lookups_fail() {
        let mut graph: DirectedWeightedGraph<f64> = DirectedWeightedGraph::new(2);
        graph.add_edge(edge(0, 1, 1.0)).unwrap();

        assert_eq!(
            graph.edge(EdgeId(5)),
            Err(GraphError::EdgeOutOfRange { edge: 5, edges: 1 })
        );
        assert_eq!(
            graph.incident_edges(VertexId(2)).err(),
            Some(GraphError::VertexOutOfRange { vertex: 2, vertices: 2 })
        );
    }

    #[test]
    fn add_edge_rejects_unknown_vertices() {
        let mut graph: DirectedWeightedGraph<f64> = DirectedWeightedGraph::new(2);
        assert_eq!(
            graph.add_edge(edge(0, 7, 1.0)),
            Err(GraphError::VertexOutOfRange { vertex: 7, vertices: 2 })
        );
        // A failed insert must not leave a dangling incidence entry.
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.incident_edges(VertexId(0)).unwrap(), &[]);
    }

    #[test]
    fn from_parts_round_trips() {
        let mut graph = DirectedWeightedGraph::new(2);
        graph.add_edge(edge(0, 1, 2.0)).unwrap();
        graph.add_edge(edge(1, 0, 3.0)).unwrap();

        let rebuilt = DirectedWeightedGraph::from_parts(
            graph.edges().to_vec(),
            graph.incidence_lists().to_vec(),
        );
        assert_eq!(rebuilt.vertex_count(), 2);
        assert_eq!(rebuilt.edge(EdgeId(1)).unwrap().weight, 3.0);
        assert_eq!(rebuilt.incident_edges(VertexId(1)).unwrap(), &[EdgeId(1)]);
    }
}
