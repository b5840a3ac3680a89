//! Concurrent append-only vertex buffer with lazy deletion.
//!
//! Supports concurrent `push` and non-concurrent `clear`. Deletion never
//! shifts neighbors; a removed slot is overwritten with a tombstone and
//! skipped by readers. Capacity is fixed at construction.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Sentinel stored in place of a removed entry.
pub const TOMBSTONE: usize = usize::MAX;

pub struct Bucket {
    entries: Box<[AtomicUsize]>,
    tail: AtomicUsize,
}

impl Bucket {
    pub fn with_capacity(capacity: usize) -> Self {
        let entries = (0..capacity).map(|_| AtomicUsize::new(TOMBSTONE)).collect();
        Bucket {
            entries,
            tail: AtomicUsize::new(0),
        }
    }

    /// Appends `v` and returns the slot it landed in. Wait-free; slot
    /// indices are claimed by a single fetch-add on the tail.
    pub fn push(&self, v: usize) -> usize {
        let idx = self.tail.fetch_add(1, Ordering::AcqRel);
        self.entries[idx].store(v, Ordering::Release);
        idx
    }

    /// Reads slot `idx`; returns [`TOMBSTONE`] for removed entries.
    pub fn read(&self, idx: usize) -> usize {
        self.entries[idx].load(Ordering::Acquire)
    }

    /// Tombstones slot `idx` in place.
    pub fn mark_removed(&self, idx: usize) {
        self.entries[idx].store(TOMBSTONE, Ordering::Release);
    }

    /// Resets the bucket for reuse. Not safe concurrently with `push`.
    pub fn clear(&self) {
        self.tail.store(0, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn push_read_and_tombstone() {
        let bucket = Bucket::with_capacity(4);
        let a = bucket.push(7);
        let b = bucket.push(9);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.read(a), 7);
        assert_eq!(bucket.read(b), 9);

        bucket.mark_removed(a);
        assert_eq!(bucket.read(a), TOMBSTONE);
        assert_eq!(bucket.read(b), 9);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn clear_resets_for_reuse() {
        let bucket = Bucket::with_capacity(2);
        bucket.push(1);
        bucket.push(2);
        bucket.clear();
        assert!(bucket.is_empty());
        let idx = bucket.push(3);
        assert_eq!(idx, 0);
        assert_eq!(bucket.read(0), 3);
    }

    #[test]
    fn concurrent_pushes_claim_distinct_slots() {
        let capacity = 8_000;
        let workers = 8;
        let per_worker = capacity / workers;
        let bucket = Bucket::with_capacity(capacity);

        thread::scope(|scope| {
            for w in 0..workers {
                let bucket = &bucket;
                scope.spawn(move || {
                    for i in 0..per_worker {
                        bucket.push(w * per_worker + i);
                    }
                });
            }
        });

        assert_eq!(bucket.len(), capacity);
        let mut seen = vec![false; capacity];
        for idx in 0..bucket.len() {
            let v = bucket.read(idx);
            assert!(v < capacity);
            assert!(!seen[v], "vertex {v} stored twice");
            seen[v] = true;
        }
    }
}
