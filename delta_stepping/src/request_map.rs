//! Lock-free coalescing of concurrent tentative-distance proposals.
//!
//! One atomic slot per vertex holds the best proposal published so far in
//! the current phase, with IEEE-754 +inf as the empty marker. The first
//! producer to claim an empty slot also enrolls the vertex in a compact
//! `touched` array, so consumers iterate only the vertices that actually
//! received proposals and each of them exactly once.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::graph::VertexId;

/// Bit pattern of +inf, the "no proposal" marker.
const EMPTY: u64 = 0x7ff0_0000_0000_0000;

pub struct RequestMap {
    slots: Box<[AtomicU64]>,
    touched: Box<[AtomicUsize]>,
    counter: AtomicUsize,
}

impl RequestMap {
    pub fn new(num_vertices: usize) -> Self {
        RequestMap {
            slots: (0..num_vertices).map(|_| AtomicU64::new(EMPTY)).collect(),
            touched: (0..num_vertices).map(|_| AtomicUsize::new(0)).collect(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Publishes `proposed` as a candidate distance for `v`.
    ///
    /// The slot value only ever decreases while a phase is producing, so
    /// the minimize loop performs at most one winning exchange per caller
    /// and the slot quiesces at the minimum over all proposals.
    pub fn add_request(&self, v: VertexId, proposed: f64) {
        let slot = &self.slots[v];
        let new_bits = proposed.to_bits();

        // Whoever replaces the empty marker enrolls v, exactly once.
        if slot.load(Ordering::Acquire) == EMPTY {
            let mut claimed = false;
            loop {
                match slot.compare_exchange_weak(
                    EMPTY,
                    new_bits,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => {
                        claimed = true;
                        break;
                    }
                    Err(seen) if seen != EMPTY => break,
                    Err(_) => {}
                }
            }
            if claimed {
                let idx = self.counter.fetch_add(1, Ordering::AcqRel);
                self.touched[idx].store(v, Ordering::Release);
            }
        }

        let mut seen = slot.load(Ordering::Acquire);
        while proposed < f64::from_bits(seen) {
            match slot.compare_exchange_weak(seen, new_bits, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(next) => seen = next,
            }
        }
    }

    /// Consumes the pending proposal for `v`, leaving the slot empty.
    /// Returns +inf if no proposal was published.
    pub fn drain(&self, v: VertexId) -> f64 {
        f64::from_bits(self.slots[v].swap(EMPTY, Ordering::AcqRel))
    }

    /// Number of distinct vertices enrolled this phase.
    pub fn len(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `idx`-th enrolled vertex, for `idx < len()`.
    pub fn target(&self, idx: usize) -> VertexId {
        self.touched[idx].load(Ordering::Acquire)
    }

    /// Forgets the enrolled vertices. Valid only after every enrolled
    /// slot has been drained.
    pub fn reset_counter(&self) {
        self.counter.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_proposal_enrolls_target() {
        let map = RequestMap::new(4);
        map.add_request(2, 1.5);
        assert_eq!(map.len(), 1);
        assert_eq!(map.target(0), 2);
    }

    #[test]
    fn repeated_proposals_enroll_once_and_keep_minimum() {
        let map = RequestMap::new(4);
        map.add_request(1, 3.0);
        map.add_request(1, 5.0);
        map.add_request(1, 2.0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.drain(1), 2.0);
    }

    #[test]
    fn drain_empties_the_slot() {
        let map = RequestMap::new(2);
        map.add_request(0, 0.25);
        assert_eq!(map.drain(0), 0.25);
        assert!(map.drain(0).is_infinite());
    }

    #[test]
    fn drain_of_untouched_slot_is_infinite() {
        let map = RequestMap::new(2);
        assert!(map.drain(1).is_infinite());
    }

    #[test]
    fn reset_allows_reuse() {
        let map = RequestMap::new(2);
        map.add_request(0, 1.0);
        map.drain(0);
        map.reset_counter();
        assert_eq!(map.len(), 0);
        map.add_request(0, 4.0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.drain(0), 4.0);
    }

    #[test]
    fn concurrent_producers_coalesce_to_minimum() {
        let n = 64;
        let workers = 8;
        let map = RequestMap::new(n);

        thread::scope(|scope| {
            for w in 0..workers {
                let map = &map;
                scope.spawn(move || {
                    for v in 0..n {
                        // every worker proposes a different value per target
                        map.add_request(v, (v + 1) as f64 * (w + 1) as f64 * 0.125);
                    }
                });
            }
        });

        assert_eq!(map.len(), n);
        let mut targets: Vec<usize> = (0..map.len()).map(|i| map.target(i)).collect();
        targets.sort_unstable();
        assert_eq!(targets, (0..n).collect::<Vec<_>>());
        for v in 0..n {
            // minimum is the w == 0 proposal
            assert_eq!(map.drain(v), (v + 1) as f64 * 0.125);
        }
    }
}
