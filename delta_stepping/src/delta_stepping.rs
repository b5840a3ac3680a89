//! Parallel delta-stepping over the fixed worker pool.
//!
//! Distances are settled one bucket of width delta at a time. Processing a
//! bucket is a sequence of barrier-delimited phases:
//!
//! 1. request generation: workers scan the out-edges of the bucket
//!    snapshot and publish improving proposals into the light or heavy
//!    request map. The edge index range is split evenly across workers
//!    (a per-slice degree prefix plus a driver-side scan locates each
//!    worker's starting node), so degree skew cannot serialize the phase.
//! 2. light settlement: workers drain the light map, commit improved
//!    distances, and migrate vertices between buckets. Re-entries into
//!    the current bucket trigger another generation round.
//! 3. heavy settlement: once the current bucket is stable, the heavy map
//!    is drained the same way.
//!
//! The bucket ring holds `ceil(max_weight / delta) + slack` slots, which
//! bounds the distinct bucket indices that can be live at once, and the
//! run ends after a full ring of consecutive empty buckets.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

use crate::bucket::{Bucket, TOMBSTONE};
use crate::graph::{Graph, VertexId};
use crate::request_map::RequestMap;
use crate::worker_pool::WorkerPool;
use crate::{ShortestPathSolver, SsspError};

/// Ring slots kept beyond `ceil(max_weight / delta)`.
pub const DEFAULT_RING_SLACK: usize = 5;

const INF_BITS: u64 = 0x7ff0_0000_0000_0000;
const NO_BUCKET: usize = usize::MAX;
const NO_POSITION: usize = usize::MAX;

pub struct DeltaStepping {
    delta: f64,
    num_threads: usize,
    ring_slack: usize,
}

impl DeltaStepping {
    pub fn new(delta: f64, num_threads: usize) -> Result<Self, SsspError> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(SsspError::InvalidDelta(delta));
        }
        if num_threads == 0 {
            return Err(SsspError::InvalidThreadCount);
        }
        Ok(DeltaStepping {
            delta,
            num_threads,
            ring_slack: DEFAULT_RING_SLACK,
        })
    }

    /// Overrides the ring slack. Larger values spend memory for more
    /// aliasing headroom between stale and fresh bucket indices.
    pub fn with_ring_slack(mut self, ring_slack: usize) -> Self {
        self.ring_slack = ring_slack.max(1);
        self
    }

    pub fn compute(&self, graph: &Graph, source: VertexId) -> Result<Vec<f64>, SsspError> {
        let n = graph.num_vertices();
        if source >= n {
            return Err(SsspError::SourceOutOfRange {
                src: source,
                vertices: n,
            });
        }

        let state = ComputeState::new(graph, source, self.delta, self.ring_slack, self.num_threads);
        let pool = WorkerPool::new(self.num_threads);
        thread::scope(|scope| {
            pool.spawn_workers(scope);
            drive(&state, &pool);
            pool.stop();
        });
        Ok(state.into_distances())
    }
}

impl ShortestPathSolver for DeltaStepping {
    fn name(&self) -> &'static str {
        "delta-stepping"
    }

    fn compute(&self, graph: &Graph, source: VertexId) -> Result<Vec<f64>, SsspError> {
        DeltaStepping::compute(self, graph, source)
    }
}

/// Shared per-run state. All fields are either read-only or touched
/// through atomics; the phase structure guarantees each distance and
/// position slot has a single writer per phase.
struct ComputeState<'g> {
    graph: &'g Graph,
    delta: f64,
    num_buckets: usize,
    dist: Box<[AtomicU64]>,
    position: Box<[AtomicUsize]>,
    buckets: Vec<Bucket>,
    light: RequestMap,
    heavy: RequestMap,
    prefix: Box<[AtomicUsize]>,
    segment_totals: Box<[AtomicUsize]>,
    current_gen: AtomicUsize,
}

impl<'g> ComputeState<'g> {
    fn new(
        graph: &'g Graph,
        source: VertexId,
        delta: f64,
        ring_slack: usize,
        num_threads: usize,
    ) -> Self {
        let n = graph.num_vertices();
        let span = (graph.max_edge_weight() / delta).ceil() as usize;
        let num_buckets = span.saturating_add(ring_slack.max(1));

        let state = ComputeState {
            graph,
            delta,
            num_buckets,
            dist: (0..n).map(|_| AtomicU64::new(INF_BITS)).collect(),
            position: (0..n).map(|_| AtomicUsize::new(NO_POSITION)).collect(),
            buckets: (0..num_buckets).map(|_| Bucket::with_capacity(n)).collect(),
            light: RequestMap::new(n),
            heavy: RequestMap::new(n),
            prefix: (0..n).map(|_| AtomicUsize::new(0)).collect(),
            segment_totals: (0..num_threads).map(|_| AtomicUsize::new(0)).collect(),
            current_gen: AtomicUsize::new(0),
        };

        state.dist[source].store(0.0_f64.to_bits(), Ordering::Relaxed);
        let idx = state.buckets[0].push(source);
        state.position[source].store(idx, Ordering::Relaxed);
        state
    }

    fn dist_of(&self, v: VertexId) -> f64 {
        f64::from_bits(self.dist[v].load(Ordering::Relaxed))
    }

    fn set_dist(&self, v: VertexId, d: f64) {
        self.dist[v].store(d.to_bits(), Ordering::Relaxed);
    }

    fn bucket_of(&self, dist: f64) -> usize {
        if dist.is_infinite() {
            NO_BUCKET
        } else {
            (dist / self.delta) as usize % self.num_buckets
        }
    }

    /// Settles one drained proposal. Called by the worker that owns `v`
    /// in this phase; no other thread writes `dist[v]` or `position[v]`
    /// until the next barrier.
    fn relax(&self, v: VertexId, requests: &RequestMap) {
        let proposed = requests.drain(v);
        if proposed < self.dist_of(v) {
            let current_gen = self.current_gen.load(Ordering::Relaxed);
            let old_bucket = self.bucket_of(self.dist_of(v));
            self.set_dist(v, proposed);
            let new_bucket = self.bucket_of(proposed);
            // the current bucket's storage is cleared after request
            // generation, so stale entries there need no tombstone and a
            // vertex staying in it must be pushed again to be seen
            if old_bucket != NO_BUCKET && old_bucket != current_gen && old_bucket != new_bucket {
                self.buckets[old_bucket].mark_removed(self.position[v].load(Ordering::Relaxed));
            }
            if old_bucket == current_gen || old_bucket != new_bucket {
                let idx = self.buckets[new_bucket].push(v);
                self.position[v].store(idx, Ordering::Relaxed);
            }
        }
    }

    /// Inclusive degree prefix over this worker's slice of the bucket
    /// snapshot, skipping tombstones.
    fn fill_degree_prefix(&self, gen: usize, lo: usize, hi: usize, tid: usize) {
        let bucket = &self.buckets[gen];
        let mut running = 0usize;
        for i in lo..hi {
            let u = bucket.read(i);
            if u != TOMBSTONE {
                running += self.graph.degree(u);
            }
            self.prefix[i].store(running, Ordering::Relaxed);
        }
        self.segment_totals[tid].store(running, Ordering::Release);
    }

    /// Scans the edge index range `[start_edge, end_edge)` of the bucket
    /// snapshot and publishes improving proposals. The starting node is
    /// found by binary search over the prefix slice of the segment the
    /// range begins in.
    #[allow(clippy::too_many_arguments)]
    fn generate_requests(
        &self,
        gen: usize,
        snapshot_len: usize,
        start_edge: usize,
        end_edge: usize,
        seg_lo: usize,
        seg_hi: usize,
        offset_in_segment: usize,
    ) {
        if start_edge >= end_edge {
            return;
        }
        let bucket = &self.buckets[gen];

        // first snapshot index whose inclusive prefix exceeds the offset
        let mut lo = seg_lo;
        let mut hi = seg_hi;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.prefix[mid].load(Ordering::Relaxed) <= offset_in_segment {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let mut node_idx = lo;
        let mut edge_off = offset_in_segment;
        if node_idx > seg_lo {
            edge_off -= self.prefix[node_idx - 1].load(Ordering::Relaxed);
        }

        let mut edge = start_edge;
        while edge < end_edge && node_idx < snapshot_len {
            let u = bucket.read(node_idx);
            if u != TOMBSTONE {
                let du = self.dist_of(u);
                for (v, w) in self.graph.adj(u).skip(edge_off) {
                    if edge >= end_edge {
                        break;
                    }
                    edge += 1;
                    // a stale dist read here only produces an extra
                    // proposal; the minimize loop drops it
                    if du + w < self.dist_of(v) {
                        if w < self.delta {
                            self.light.add_request(v, du + w);
                        } else {
                            self.heavy.add_request(v, du + w);
                        }
                    }
                }
            }
            node_idx += 1;
            edge_off = 0;
        }
    }

    fn into_distances(self) -> Vec<f64> {
        self.dist
            .iter()
            .map(|bits| f64::from_bits(bits.load(Ordering::Relaxed)))
            .collect()
    }
}

fn drive<'env>(state: &'env ComputeState<'env>, pool: &WorkerPool<'env>) {
    let workers = pool.num_workers();
    let num_buckets = state.num_buckets;
    let mut gen = 0usize;
    let mut idle_generations = 0usize;

    while idle_generations < num_buckets {
        state.current_gen.store(gen, Ordering::Relaxed);

        while !state.buckets[gen].is_empty() {
            idle_generations = 0;
            let snapshot_len = state.buckets[gen].len();
            let nodes_per_worker = snapshot_len.div_ceil(workers);

            // degree prefixes per worker slice
            for tid in 0..workers {
                let lo = (tid * nodes_per_worker).min(snapshot_len);
                let hi = (lo + nodes_per_worker).min(snapshot_len);
                pool.push(tid, move || state.fill_degree_prefix(gen, lo, hi, tid));
            }
            pool.wait();

            // inclusive scan of per-worker edge totals
            let mut segment_pref = vec![0usize; workers];
            let mut total_edges = 0usize;
            for tid in 0..workers {
                total_edges += state.segment_totals[tid].load(Ordering::Acquire);
                segment_pref[tid] = total_edges;
            }

            // even split of the edge index range
            let edge_chunk = total_edges.div_ceil(workers);
            let mut seg = 0usize;
            for tid in 0..workers {
                let start_edge = tid * edge_chunk;
                let end_edge = (start_edge + edge_chunk).min(total_edges);
                while seg < workers && start_edge >= segment_pref[seg] {
                    seg += 1;
                }
                let base = if seg > 0 { segment_pref[seg - 1] } else { 0 };
                let offset_in_segment = start_edge.saturating_sub(base);
                let seg_lo = (seg * nodes_per_worker).min(snapshot_len);
                let seg_hi = (seg_lo + nodes_per_worker).min(snapshot_len);
                pool.push(tid, move || {
                    state.generate_requests(
                        gen,
                        snapshot_len,
                        start_edge,
                        end_edge,
                        seg_lo,
                        seg_hi,
                        offset_in_segment,
                    )
                });
            }
            pool.wait();
            // the snapshot has been fully consumed
            state.buckets[gen].clear();

            relax_phase(state, pool, &state.light);
            state.light.reset_counter();
        }

        relax_phase(state, pool, &state.heavy);
        state.heavy.reset_counter();

        gen = (gen + 1) % num_buckets;
        idle_generations += 1;
    }

    debug_assert!(
        state.buckets.iter().all(Bucket::is_empty),
        "live bucket left behind at termination"
    );
}

fn relax_phase<'env>(
    state: &'env ComputeState<'env>,
    pool: &WorkerPool<'env>,
    requests: &'env RequestMap,
) {
    let pending = requests.len();
    if pending == 0 {
        return;
    }
    let workers = pool.num_workers();
    let chunk = pending.div_ceil(workers);
    for tid in 0..workers {
        let lo = (tid * chunk).min(pending);
        let hi = (lo + chunk).min(pending);
        pool.push(tid, move || {
            for idx in lo..hi {
                state.relax(requests.target(idx), requests);
            }
        });
    }
    pool.wait();
}
