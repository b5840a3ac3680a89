//! Parallel single-source shortest paths for directed graphs with
//! non-negative real edge weights.
//!
//! The heart of the crate is [`DeltaStepping`], a multi-threaded
//! delta-stepping engine: vertices live in distance buckets of width
//! delta, edges split into light (`w < delta`) and heavy (`w >= delta`)
//! classes, and each bucket is relaxed to a fixed point before its heavy
//! edges propagate. [`Dijkstra`] and [`DeltaSteppingSequential`] provide
//! sequential references, and the `generators`/`io` modules supply the
//! synthetic graph families and the text edge-list format used by the
//! benchmark binaries.

pub mod bucket;
mod delta_stepping;
pub mod generators;
pub mod graph;
pub mod io;
pub mod request_map;
pub mod sequential;
pub mod worker_pool;

pub use crate::delta_stepping::{DeltaStepping, DEFAULT_RING_SLACK};
pub use crate::graph::{Edge, Graph, VertexId};
pub use crate::sequential::{Dijkstra, DeltaSteppingSequential};

use thiserror::Error;

/// Errors raised at solver construction or entry. The solve itself is
/// infallible on valid inputs and never returns partial results.
#[derive(Debug, Error)]
pub enum SsspError {
    #[error("delta must be positive and finite, got {0}")]
    InvalidDelta(f64),
    #[error("at least one worker thread is required")]
    InvalidThreadCount,
    #[error("source vertex {src} out of range for a graph with {vertices} vertices")]
    SourceOutOfRange { src: usize, vertices: usize },
}

/// Errors raised while building or loading a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge ({u}, {v}) has invalid weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { u: usize, v: usize, weight: f64 },
    #[error("edge endpoint {vertex} out of range for a graph with {vertices} vertices")]
    EndpointOutOfRange { vertex: usize, vertices: usize },
    #[error("no edges found in {path}")]
    Empty { path: String },
    #[error("failed to read graph file")]
    Read(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Common seam over the sequential references and the parallel engine,
/// so harnesses can sweep solver configurations uniformly.
pub trait ShortestPathSolver {
    fn name(&self) -> &'static str;
    fn compute(&self, graph: &Graph, source: VertexId) -> Result<Vec<f64>, SsspError>;
}

/// Element-wise distance comparison: +inf matches only +inf, finite
/// values match within `epsilon` (absolute below 1, relative above).
pub fn distances_match(a: &[f64], b: &[f64], epsilon: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| {
        if x.is_infinite() && y.is_infinite() {
            return true;
        }
        if x.is_infinite() || y.is_infinite() {
            return false;
        }
        let tolerance = if x.abs() < 1.0 {
            epsilon
        } else {
            epsilon * x.abs()
        };
        (x - y).abs() <= tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_match_handles_infinities() {
        assert!(distances_match(
            &[0.0, f64::INFINITY],
            &[0.0, f64::INFINITY],
            1e-9
        ));
        assert!(!distances_match(&[0.0, f64::INFINITY], &[0.0, 1.0], 1e-9));
        assert!(!distances_match(&[0.0, 1.0], &[0.0, f64::INFINITY], 1e-9));
    }

    #[test]
    fn distances_match_is_relative_above_one() {
        assert!(distances_match(&[1e6], &[1e6 + 1e-4], 1e-9));
        assert!(!distances_match(&[0.5], &[0.5 + 1e-4], 1e-9));
        assert!(!distances_match(&[1.0], &[1.0, 2.0], 1e-9));
    }
}
