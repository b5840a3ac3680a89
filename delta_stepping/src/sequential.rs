//! Sequential reference solvers: binary-heap Dijkstra and single-threaded
//! delta-stepping. Dijkstra is the correctness oracle throughout the test
//! suite; the sequential delta-stepping variant also wins outright on
//! small inputs where coordination overhead dominates.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use ordered_float::OrderedFloat;

use crate::graph::{Graph, VertexId};
use crate::{ShortestPathSolver, SsspError};

#[derive(Debug, PartialEq, Eq)]
struct State {
    node: VertexId,
    cost: OrderedFloat<f64>,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Classic binary-heap Dijkstra. Decrease-key is simulated by pushing a
/// fresh entry and skipping stale pops.
pub struct Dijkstra;

impl ShortestPathSolver for Dijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn compute(&self, graph: &Graph, source: VertexId) -> Result<Vec<f64>, SsspError> {
        let n = graph.num_vertices();
        if source >= n {
            return Err(SsspError::SourceOutOfRange {
                src: source,
                vertices: n,
            });
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut heap = BinaryHeap::new();
        dist[source] = 0.0;
        heap.push(State {
            node: source,
            cost: OrderedFloat(0.0),
        });

        while let Some(State { node, cost }) = heap.pop() {
            if cost.0 > dist[node] {
                continue;
            }
            for (v, w) in graph.adj(node) {
                let next = cost.0 + w;
                if next < dist[v] {
                    dist[v] = next;
                    heap.push(State {
                        node: v,
                        cost: OrderedFloat(next),
                    });
                }
            }
        }

        Ok(dist)
    }
}

fn bucket_of(dist: f64, delta: f64) -> Option<usize> {
    if dist.is_infinite() {
        None
    } else {
        Some((dist / delta) as usize)
    }
}

/// Single-threaded delta-stepping over growable set buckets.
pub struct DeltaSteppingSequential {
    delta: f64,
}

impl DeltaSteppingSequential {
    pub fn new(delta: f64) -> Result<Self, SsspError> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(SsspError::InvalidDelta(delta));
        }
        Ok(DeltaSteppingSequential { delta })
    }
}

fn relax(
    dist: &mut [f64],
    buckets: &mut Vec<HashSet<VertexId>>,
    v: VertexId,
    proposed: f64,
    delta: f64,
) {
    if proposed < dist[v] {
        let old_bucket = bucket_of(dist[v], delta);
        dist[v] = proposed;
        let new_bucket = (proposed / delta) as usize;
        if let Some(old_bucket) = old_bucket {
            buckets[old_bucket].remove(&v);
        }
        if new_bucket >= buckets.len() {
            buckets.resize_with(new_bucket + 1, HashSet::new);
        }
        buckets[new_bucket].insert(v);
    }
}

impl ShortestPathSolver for DeltaSteppingSequential {
    fn name(&self) -> &'static str {
        "delta-stepping-seq"
    }

    fn compute(&self, graph: &Graph, source: VertexId) -> Result<Vec<f64>, SsspError> {
        let n = graph.num_vertices();
        if source >= n {
            return Err(SsspError::SourceOutOfRange {
                src: source,
                vertices: n,
            });
        }
        let delta = self.delta;

        // split adjacency once so the inner loops touch only one class
        let mut light: Vec<Vec<(VertexId, f64)>> = vec![Vec::new(); n];
        let mut heavy: Vec<Vec<(VertexId, f64)>> = vec![Vec::new(); n];
        for u in 0..n {
            for (v, w) in graph.adj(u) {
                if w < delta {
                    light[u].push((v, w));
                } else {
                    heavy[u].push((v, w));
                }
            }
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut buckets: Vec<HashSet<VertexId>> = vec![HashSet::new()];
        buckets[0].insert(source);
        dist[source] = 0.0;

        let mut i = 0;
        while i < buckets.len() {
            let mut settled: HashSet<VertexId> = HashSet::new();
            while !buckets[i].is_empty() {
                let current: Vec<VertexId> = buckets[i].drain().collect();
                for u in current {
                    let du = dist[u];
                    for &(v, w) in &light[u] {
                        relax(&mut dist, &mut buckets, v, du + w, delta);
                    }
                    settled.insert(u);
                }
            }
            for &u in &settled {
                let du = dist[u];
                for &(v, w) in &heavy[u] {
                    relax(&mut dist, &mut buckets, v, du + w, delta);
                }
            }
            i += 1;
        }

        Ok(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distances_match;
    use crate::graph::Edge;

    fn graph_from(n: usize, edges: &[(usize, usize, f64)]) -> Graph {
        let edges: Vec<Edge> = edges.iter().map(|&(u, v, w)| Edge::new(u, v, w)).collect();
        Graph::from_edges(n, &edges).unwrap()
    }

    fn solvers(delta: f64) -> Vec<Box<dyn ShortestPathSolver>> {
        vec![
            Box::new(Dijkstra),
            Box::new(DeltaSteppingSequential::new(delta).unwrap()),
        ]
    }

    #[test]
    fn chain_distances() {
        let graph = graph_from(4, &[(0, 1, 0.3), (1, 2, 0.7), (2, 3, 0.2)]);
        for solver in solvers(0.4) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert!(
                distances_match(&dist, &[0.0, 0.3, 1.0, 1.2], 1e-9),
                "{} returned {:?}",
                solver.name(),
                dist
            );
        }
    }

    #[test]
    fn triangle_takes_the_shortcut() {
        let graph = graph_from(3, &[(0, 1, 0.5), (0, 2, 0.8), (1, 2, 0.2)]);
        for solver in solvers(0.3) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert!(distances_match(&dist, &[0.0, 0.5, 0.7], 1e-9));
        }
    }

    #[test]
    fn diamond_prefers_the_cheaper_side() {
        let graph = graph_from(4, &[(0, 1, 1.0), (0, 2, 2.0), (1, 3, 2.0), (2, 3, 0.5)]);
        for solver in solvers(0.75) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert!(distances_match(&dist, &[0.0, 1.0, 2.0, 2.5], 1e-9));
        }
    }

    #[test]
    fn star_reaches_every_leaf() {
        let n = 12;
        let spokes: Vec<(usize, usize, f64)> = (1..n).map(|v| (0, v, 1.0)).collect();
        let graph = graph_from(n, &spokes);
        let mut expected = vec![1.0; n];
        expected[0] = 0.0;
        for solver in solvers(0.5) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert!(distances_match(&dist, &expected, 1e-9));
        }
    }

    #[test]
    fn complete_k5_with_scaled_weights() {
        let mut edges = Vec::new();
        for i in 0..5usize {
            for j in 0..5usize {
                if i != j {
                    edges.push((i, j, (i as f64 - j as f64).abs() * 0.1));
                }
            }
        }
        let graph = graph_from(5, &edges);
        for solver in solvers(0.25) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert!(distances_match(&dist, &[0.0, 0.1, 0.2, 0.3, 0.4], 1e-9));
        }
    }

    #[test]
    fn unreachable_vertex_stays_infinite() {
        let graph = graph_from(2, &[]);
        for solver in solvers(1.0) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert_eq!(dist[0], 0.0);
            assert!(dist[1].is_infinite());
        }
    }

    #[test]
    fn self_loop_is_ignored() {
        let graph = graph_from(1, &[(0, 0, 2.0)]);
        for solver in solvers(1.0) {
            let dist = solver.compute(&graph, 0).unwrap();
            assert_eq!(dist, vec![0.0]);
        }
    }

    #[test]
    fn source_out_of_range_is_rejected() {
        let graph = graph_from(2, &[(0, 1, 1.0)]);
        for solver in solvers(1.0) {
            assert!(matches!(
                solver.compute(&graph, 2),
                Err(SsspError::SourceOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn invalid_delta_is_rejected() {
        assert!(matches!(
            DeltaSteppingSequential::new(0.0),
            Err(SsspError::InvalidDelta(_))
        ));
        assert!(matches!(
            DeltaSteppingSequential::new(-1.0),
            Err(SsspError::InvalidDelta(_))
        ));
    }

    #[test]
    fn sequential_variants_agree_on_a_dense_mesh() {
        // deterministic pseudo-random mesh, fixed multiplier hashing
        let n = 60;
        let mut edges = Vec::new();
        let mut state = 0x9e37_79b9_usize;
        for u in 0..n {
            for _ in 0..5 {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let v = state >> 33;
                let v = v % n;
                if v != u {
                    let w = ((state >> 11) % 1000) as f64 / 1000.0;
                    edges.push((u, v, w));
                }
            }
        }
        let graph = graph_from(n, &edges);
        let reference = Dijkstra.compute(&graph, 0).unwrap();
        for delta in [0.05, 0.2, 0.9, 2.0] {
            let dist = DeltaSteppingSequential::new(delta)
                .unwrap()
                .compute(&graph, 0)
                .unwrap();
            assert!(
                distances_match(&dist, &reference, 1e-9),
                "delta {delta} diverged from dijkstra"
            );
        }
    }
}
