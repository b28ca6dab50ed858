//! Bounded top-k selection over a stream of scored items.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Entry<T> {
    score: f64,
    /// Arrival sequence number, the tie-breaker: earlier arrivals win.
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Primary: score. On ties a later arrival orders as smaller, so the
        // min-heap evicts the newest of equally-scored entries first.
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Keeps the `capacity` highest-scoring items from a stream.
///
/// A min-heap of at most `capacity` entries: pushes insert while under
/// capacity, then replace the current minimum only when the new score is
/// strictly greater. Ties therefore never displace an earlier arrival.
pub struct TopK<T> {
    capacity: usize,
    seq: u64,
    heap: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seq: 0,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T, score: f64) {
        let entry = Entry {
            score,
            seq: self.seq,
            item,
        };
        self.seq += 1;
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
        } else if let Some(mut min) = self.heap.peek_mut() {
            if entry.score > min.0.score {
                min.0 = entry;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drains the heap into (item, score) pairs, best first. Equal scores
    /// keep arrival order. Returns fewer than `capacity` pairs when fewer
    /// were pushed; the result is never padded.
    pub fn into_ranked(self) -> Vec<(T, f64)> {
        let mut entries: Vec<Entry<T>> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| (e.item, e.score)).collect()
    }
}
