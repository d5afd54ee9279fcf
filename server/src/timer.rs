//! One-shot timers keyed by host time.
//!
//! The queue never runs callbacks itself: the owner polls [`TimerQueue::pop_due`] once per loop
//! iteration and handles each payload. Handles can be cancelled at any time; cancelling a timer
//! that already fired, or was already popped, is a no-op.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashSet},
};

/// Opaque handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    due: f64,
    id: TimerId,
    payload: T,
}

// Ordering ignores the payload: earliest due first, then scheduling order.
impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Min-heap of one-shot timers.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<Scheduled<T>>>,
    pending: HashSet<TimerId>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to come due at host time `due`.
    pub fn schedule_at(&mut self, due: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.insert(id);
        self.heap.push(Reverse(Scheduled { due, id, payload }));
        id
    }

    /// Cancels a timer. Returns true if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pops the next timer due at or before `now`, skipping cancelled ones.
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerId, T)> {
        loop {
            let Reverse(next) = self.heap.peek()?;
            if next.due > now {
                return None;
            }
            let Reverse(next) = self.heap.pop()?;
            if self.pending.remove(&next.id) {
                return Some((next.id, next.payload));
            }
        }
    }

    /// Drops every timer without firing it.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}
