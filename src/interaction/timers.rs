//! Cancellable delayed callbacks.
//!
//! The grid runs on a single thread; delayed work (long-press recognition,
//! edge navigation) is queued here with a deadline and handed back by
//! [`TimerQueue::take_due`] when the host polls with the current time. A
//! cancelled timer is removed and can never be returned afterwards.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct PendingTimer<K> {
    id: TimerId,
    deadline: Instant,
    kind: K,
}

#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<PendingTimer<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            id,
            deadline: now + delay,
            kind,
        });
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(TimerId, K)> {
        let mut due: Vec<PendingTimer<K>> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].deadline <= now {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        due.into_iter().map(|timer| (timer.id, timer.kind)).collect()
    }
}
