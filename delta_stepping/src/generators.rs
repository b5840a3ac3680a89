//! Synthetic graph families for testing and benchmarking.
//!
//! Every generator takes a seed and draws weights from a
//! [`WeightDistribution`]. The random families (random, scale-free, RMAT)
//! are restricted to their largest weakly connected component, with
//! vertex ids densely remapped, so a benchmark source reaches most of the
//! graph.

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{Edge, Graph, VertexId};

/// Edge-weight distribution shared by all families.
#[derive(Debug, Clone, Copy)]
pub enum WeightDistribution {
    /// Uniform on `[lo, hi)`.
    Uniform { lo: f64, hi: f64 },
    /// Pareto tail with shape `alpha`; the generated weights are rescaled
    /// so the maximum observed weight is 1.
    PowerLaw { alpha: f64 },
}

impl WeightDistribution {
    fn sample(&self, rng: &mut StdRng) -> f64 {
        match *self {
            WeightDistribution::Uniform { lo, hi } => lo + (hi - lo) * rng.gen::<f64>(),
            WeightDistribution::PowerLaw { alpha } => {
                let u: f64 = rng.gen();
                (1.0 - u).powf(-1.0 / alpha)
            }
        }
    }

    fn needs_rescale(&self) -> bool {
        matches!(self, WeightDistribution::PowerLaw { .. })
    }
}

fn build(num_vertices: usize, mut edges: Vec<Edge>, weights: WeightDistribution) -> Graph {
    if weights.needs_rescale() {
        let max = edges.iter().map(|e| e.w).fold(0.0_f64, f64::max);
        if max > 0.0 {
            for edge in &mut edges {
                edge.w /= max;
            }
        }
    }
    Graph::from_edges(num_vertices, &edges).expect("generated edges are valid")
}

/// Connected components of the underlying undirected graph.
fn connected_components(num_vertices: usize, edges: &[Edge]) -> Vec<Vec<VertexId>> {
    let mut adjacency = vec![Vec::new(); num_vertices];
    for edge in edges {
        adjacency[edge.u].push(edge.v);
        adjacency[edge.v].push(edge.u);
    }

    let mut visited = vec![false; num_vertices];
    let mut components = Vec::new();
    for start in 0..num_vertices {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(u) = queue.pop_front() {
            component.push(u);
            for &v in &adjacency[u] {
                if !visited[v] {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Keeps only the largest weakly connected component, remapping its
/// vertices to a dense `0..k` range.
fn largest_component(num_vertices: usize, edges: Vec<Edge>, weights: WeightDistribution) -> Graph {
    if edges.is_empty() {
        return build(num_vertices.min(1), Vec::new(), weights);
    }

    let components = connected_components(num_vertices, &edges);
    let largest = components
        .iter()
        .max_by_key(|component| component.len())
        .expect("edge list is non-empty");

    let mut remap = vec![usize::MAX; num_vertices];
    for (fresh, &old) in largest.iter().enumerate() {
        remap[old] = fresh;
    }

    let remapped: Vec<Edge> = edges
        .into_iter()
        .filter(|edge| remap[edge.u] != usize::MAX && remap[edge.v] != usize::MAX)
        .map(|edge| Edge::new(remap[edge.u], remap[edge.v], edge.w))
        .collect();

    build(largest.len(), remapped, weights)
}

/// Uniform random graph with `n` vertices and (about) `m` distinct edges,
/// generated by dart throwing with an attempt cap.
pub fn random_graph(
    n: usize,
    m: usize,
    weights: WeightDistribution,
    undirected: bool,
    seed: u64,
) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edge_set: HashSet<(VertexId, VertexId)> = HashSet::with_capacity(m);
    let mut edges = Vec::with_capacity(m);

    let mut attempts = 0usize;
    while edges.len() < m && attempts < m.saturating_mul(100) {
        attempts += 1;
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v || !edge_set.insert((u, v)) {
            continue;
        }
        let w = weights.sample(&mut rng);
        edges.push(Edge::new(u, v, w));
        if undirected && edge_set.insert((v, u)) {
            edges.push(Edge::new(v, u, w));
        }
    }

    largest_component(n, edges, weights)
}

/// Complete directed graph on `n` vertices.
pub fn complete_graph(n: usize, weights: WeightDistribution, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(n.saturating_mul(n.saturating_sub(1)));
    for u in 0..n {
        for v in 0..n {
            if u != v {
                edges.push(Edge::new(u, v, weights.sample(&mut rng)));
            }
        }
    }
    build(n, edges, weights)
}

/// `rows x cols` grid with 4-neighborhood edges. Connected by
/// construction.
pub fn grid_graph(
    rows: usize,
    cols: usize,
    weights: WeightDistribution,
    undirected: bool,
    seed: u64,
) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let index = |row: usize, col: usize| row * cols + col;
    let mut edges = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                let w = weights.sample(&mut rng);
                edges.push(Edge::new(index(row, col), index(row, col + 1), w));
                if undirected {
                    edges.push(Edge::new(index(row, col + 1), index(row, col), w));
                }
            }
            if row + 1 < rows {
                let w = weights.sample(&mut rng);
                edges.push(Edge::new(index(row, col), index(row + 1, col), w));
                if undirected {
                    edges.push(Edge::new(index(row + 1, col), index(row, col), w));
                }
            }
        }
    }

    build(rows * cols, edges, weights)
}

/// Linear chain `0 -> 1 -> ... -> n-1`.
pub fn path_graph(n: usize, weights: WeightDistribution, undirected: bool, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(if undirected { 2 * n } else { n });
    for u in 0..n.saturating_sub(1) {
        let w = weights.sample(&mut rng);
        edges.push(Edge::new(u, u + 1, w));
        if undirected {
            edges.push(Edge::new(u + 1, u, w));
        }
    }
    build(n, edges, weights)
}

/// Preferential-attachment graph: each new vertex connects to
/// `edges_per_vertex` earlier vertices with probability proportional to
/// their degree, seeded by a small clique.
pub fn scale_free_graph(
    n: usize,
    edges_per_vertex: usize,
    weights: WeightDistribution,
    undirected: bool,
    seed: u64,
) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    let mut degrees = vec![0usize; n];

    let clique = n.min(3);
    for i in 0..clique {
        for j in (i + 1)..clique {
            let w = weights.sample(&mut rng);
            edges.push(Edge::new(i, j, w));
            degrees[i] += 1;
            degrees[j] += 1;
            if undirected {
                edges.push(Edge::new(j, i, w));
            }
        }
    }

    for fresh in clique..n {
        let total_degree: usize = degrees[..fresh].iter().sum();
        let target_count = edges_per_vertex.min(fresh);
        let mut connected = HashSet::new();

        // one guaranteed edge keeps the graph connected
        let anchor = rng.gen_range(0..fresh);
        let w = weights.sample(&mut rng);
        edges.push(Edge::new(fresh, anchor, w));
        degrees[fresh] += 1;
        degrees[anchor] += 1;
        connected.insert(anchor);
        if undirected {
            edges.push(Edge::new(anchor, fresh, w));
        }

        let mut attempts = 0;
        while connected.len() < target_count && attempts < target_count * 3 {
            attempts += 1;
            for candidate in 0..fresh {
                if connected.len() >= target_count {
                    break;
                }
                if connected.contains(&candidate) {
                    continue;
                }
                let probability = (degrees[candidate] + 1) as f64 / (total_degree + fresh) as f64;
                if rng.gen::<f64>() < probability {
                    let w = weights.sample(&mut rng);
                    edges.push(Edge::new(fresh, candidate, w));
                    degrees[fresh] += 1;
                    degrees[candidate] += 1;
                    connected.insert(candidate);
                    if undirected {
                        edges.push(Edge::new(candidate, fresh, w));
                    }
                }
            }
        }
    }

    largest_component(n, edges, weights)
}

/// Recursive-matrix graph: each edge picks a quadrant per level with
/// skewed probabilities, yielding a heavy-tailed degree distribution.
pub fn rmat_graph(
    n: usize,
    m: usize,
    weights: WeightDistribution,
    undirected: bool,
    seed: u64,
) -> Graph {
    const A: f64 = 0.57;
    const B: f64 = 0.19;
    const C: f64 = 0.19;

    let scale = usize::BITS - n.max(2).next_power_of_two().leading_zeros() - 1;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edge_set: HashSet<(VertexId, VertexId)> = HashSet::with_capacity(m);
    let mut edges = Vec::with_capacity(m);

    let mut attempts = 0usize;
    while edges.len() < m && attempts < m.saturating_mul(100) {
        attempts += 1;
        let mut u = 0usize;
        let mut v = 0usize;
        let mut span = 1usize << scale;
        for _ in 0..scale {
            span >>= 1;
            let r: f64 = rng.gen();
            if r < A {
                // upper-left quadrant
            } else if r < A + B {
                v += span;
            } else if r < A + B + C {
                u += span;
            } else {
                u += span;
                v += span;
            }
        }
        if u == v || u >= n || v >= n || !edge_set.insert((u, v)) {
            continue;
        }
        let w = weights.sample(&mut rng);
        edges.push(Edge::new(u, v, w));
        if undirected && edge_set.insert((v, u)) {
            edges.push(Edge::new(v, u, w));
        }
    }

    largest_component(n, edges, weights)
}
