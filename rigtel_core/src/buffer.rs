//! Bounded, thread-safe, overwrite-oldest store of recent readings.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::reading::Reading;

/// Fixed-capacity ring of readings, oldest first.
///
/// Exactly one producer calls `push`; any number of readers call `latest` /
/// `recent` concurrently. The mutex scopes are minimal: evict-then-insert on
/// write, copy-out on read. Entries are always in non-decreasing sequence
/// order because the single producer pushes in assignment order.
#[derive(Debug)]
pub struct TelemetryBuffer {
    inner: Mutex<VecDeque<Reading>>,
    capacity: usize,
}

impl TelemetryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append a reading, evicting the oldest entry when full. Amortized O(1).
    pub fn push(&self, reading: Reading) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(reading);
    }

    /// Most recently pushed reading, if any. Never blocks beyond the short
    /// critical section; never fails.
    pub fn latest(&self) -> Option<Reading> {
        self.lock().back().cloned()
    }

    /// Up to `n` most recent readings, oldest-first among the returned
    /// subset. `recent(0)` and an empty buffer both yield an empty vec; `n`
    /// larger than the current length yields everything. A single call
    /// returns a consistent, non-torn slice.
    pub fn recent(&self, n: usize) -> Vec<Reading> {
        let entries = self.lock();
        let take = n.min(entries.len());
        entries.iter().skip(entries.len() - take).cloned().collect()
    }

    // A panicked holder leaves the data structurally intact (evict/insert
    // never unwinds mid-update), so poisoning is recovered rather than
    // propagated to readers.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Reading>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(sequence: u64) -> Reading {
        Reading::from_values(sequence, [1.0, 2.0, 3.0, 4.0, 5.0, 0.5], None)
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let buf = TelemetryBuffer::new(4);
        assert!(buf.latest().is_none());
        assert!(buf.recent(10).is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn push_then_latest() {
        let buf = TelemetryBuffer::new(4);
        buf.push(reading(1));
        buf.push(reading(2));
        assert_eq!(buf.latest().map(|r| r.sequence), Some(2));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn overflow_evicts_oldest_fifo() {
        let buf = TelemetryBuffer::new(3);
        for s in 1..=4 {
            buf.push(reading(s));
        }
        let seqs: Vec<u64> = buf.recent(10).iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, [2, 3, 4]);
        assert_eq!(buf.latest().map(|r| r.sequence), Some(4));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn recent_clamps_and_orders() {
        let buf = TelemetryBuffer::new(10);
        for s in 1..=5 {
            buf.push(reading(s));
        }
        assert!(buf.recent(0).is_empty());
        let last_two: Vec<u64> = buf.recent(2).iter().map(|r| r.sequence).collect();
        assert_eq!(last_two, [4, 5]);
        let all: Vec<u64> = buf.recent(50).iter().map(|r| r.sequence).collect();
        assert_eq!(all, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let buf = TelemetryBuffer::new(0);
        buf.push(reading(1));
        buf.push(reading(2));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest().map(|r| r.sequence), Some(2));
    }
}
