//! Compressed sparse row adjacency for directed graphs with non-negative
//! real edge weights. Nodes are 0-indexed; the structure is immutable
//! after construction.

use crate::GraphError;

pub type VertexId = usize;

/// A directed edge `u -> v` with weight `w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub u: VertexId,
    pub v: VertexId,
    pub w: f64,
}

impl Edge {
    pub fn new(u: VertexId, v: VertexId, w: f64) -> Self {
        Edge { u, v, w }
    }
}

/// CSR adjacency. Row `u` holds the out-edges of `u` in insertion order;
/// `degree` is O(1) from the offset array.
#[derive(Debug, Clone)]
pub struct Graph {
    offsets: Vec<usize>,
    targets: Vec<VertexId>,
    weights: Vec<f64>,
    max_weight: f64,
}

impl Graph {
    /// Builds the CSR arrays from an edge list. Rejects edges with
    /// out-of-range endpoints or weights that are negative or non-finite.
    pub fn from_edges(num_vertices: usize, edges: &[Edge]) -> Result<Self, GraphError> {
        let mut degrees = vec![0usize; num_vertices];
        let mut max_weight = 0.0_f64;
        for edge in edges {
            if edge.u >= num_vertices {
                return Err(GraphError::EndpointOutOfRange {
                    vertex: edge.u,
                    vertices: num_vertices,
                });
            }
            if edge.v >= num_vertices {
                return Err(GraphError::EndpointOutOfRange {
                    vertex: edge.v,
                    vertices: num_vertices,
                });
            }
            if !edge.w.is_finite() || edge.w < 0.0 {
                return Err(GraphError::InvalidWeight {
                    u: edge.u,
                    v: edge.v,
                    weight: edge.w,
                });
            }
            degrees[edge.u] += 1;
            max_weight = max_weight.max(edge.w);
        }

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut running = 0usize;
        offsets.push(0);
        for degree in &degrees {
            running += degree;
            offsets.push(running);
        }

        let mut cursor = offsets[..num_vertices].to_vec();
        let mut targets = vec![0 as VertexId; edges.len()];
        let mut weights = vec![0.0_f64; edges.len()];
        for edge in edges {
            let slot = cursor[edge.u];
            targets[slot] = edge.v;
            weights[slot] = edge.w;
            cursor[edge.u] += 1;
        }

        Ok(Graph {
            offsets,
            targets,
            weights,
            max_weight,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.targets.len()
    }

    pub fn degree(&self, u: VertexId) -> usize {
        self.offsets[u + 1] - self.offsets[u]
    }

    /// Out-edges of `u` as `(target, weight)` pairs, in insertion order.
    pub fn adj(&self, u: VertexId) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        let span = self.offsets[u]..self.offsets[u + 1];
        self.targets[span.clone()]
            .iter()
            .copied()
            .zip(self.weights[span].iter().copied())
    }

    /// All edges of the graph, grouped by source vertex.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_vertices())
            .flat_map(move |u| self.adj(u).map(move |(v, w)| Edge { u, v, w }))
    }

    pub fn max_edge_weight(&self) -> f64 {
        self.max_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_layout_preserves_insertion_order() {
        let edges = [
            Edge::new(0, 1, 0.5),
            Edge::new(1, 2, 0.25),
            Edge::new(0, 2, 1.5),
            Edge::new(2, 0, 0.75),
        ];
        let graph = Graph::from_edges(3, &edges).unwrap();

        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(1), 1);
        assert_eq!(graph.adj(0).collect::<Vec<_>>(), vec![(1, 0.5), (2, 1.5)]);
        assert_eq!(graph.adj(2).collect::<Vec<_>>(), vec![(0, 0.75)]);
        assert_eq!(graph.max_edge_weight(), 1.5);
    }

    #[test]
    fn isolated_vertices_have_empty_rows() {
        let graph = Graph::from_edges(4, &[Edge::new(0, 3, 1.0)]).unwrap();
        assert_eq!(graph.degree(1), 0);
        assert_eq!(graph.degree(2), 0);
        assert_eq!(graph.adj(2).count(), 0);
    }

    #[test]
    fn empty_graph_is_allowed() {
        let graph = Graph::from_edges(0, &[]).unwrap();
        assert_eq!(graph.num_vertices(), 0);
        assert_eq!(graph.num_edges(), 0);
        assert_eq!(graph.max_edge_weight(), 0.0);
    }

    #[test]
    fn rejects_negative_weight() {
        let err = Graph::from_edges(2, &[Edge::new(0, 1, -0.1)]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
    }

    #[test]
    fn rejects_non_finite_weight() {
        let err = Graph::from_edges(2, &[Edge::new(0, 1, f64::NAN)]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
        let err = Graph::from_edges(2, &[Edge::new(0, 1, f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let err = Graph::from_edges(2, &[Edge::new(0, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, GraphError::EndpointOutOfRange { .. }));
    }

    #[test]
    fn edges_round_trips_the_edge_list() {
        let edges = [Edge::new(0, 1, 0.5), Edge::new(1, 0, 0.5)];
        let graph = Graph::from_edges(2, &edges).unwrap();
        let collected: Vec<Edge> = graph.edges().collect();
        assert_eq!(collected, edges);
    }
}
