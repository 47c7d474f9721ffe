//! Delayed actions, polled once per tick

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Scheduled<A> {
    due: f64,
    sequence: u64,
    action: A,
}

impl<A> PartialEq for Scheduled<A> {
    fn eq(&self, other: &Self) -> bool {
        self.due.total_cmp(&other.due) == Ordering::Equal && self.sequence == other.sequence
    }
}

impl<A> Eq for Scheduled<A> {}

impl<A> PartialOrd for Scheduled<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Scheduled<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest first
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of `(due time, action)` pairs.
///
/// Entries due at the same time come out in insertion order.
#[derive(Debug)]
pub struct TimerQueue<A> {
    heap: BinaryHeap<Scheduled<A>>,
    sequence: u64,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Schedule `action` at absolute time `due` (seconds)
    pub fn schedule_at(&mut self, due: f64, action: A) {
        if !due.is_finite() {
            log::warn!("dropping timer with non-finite due time {}", due);
            return;
        }
        self.heap.push(Scheduled {
            due,
            sequence: self.sequence,
            action,
        });
        self.sequence += 1;
    }

    /// Schedule `action` `delay` seconds after `now`
    pub fn schedule_in(&mut self, now: f64, delay: f64, action: A) {
        self.schedule_at(now + delay.max(0.0), action);
    }

    /// Remove and return every action due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: f64) -> Vec<A> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|entry| entry.due <= now) {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.action);
            }
        }
        due
    }

    /// Due time of the earliest entry
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.due)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
