//! Cancellable timer queue
//!
//! The cooperative host event loop seen from the scheduler: one-shot timers
//! keyed by zone, each identified by the handle returned when it was
//! scheduled. Time is virtual and only moves when the host drives the queue,
//! which keeps preview sessions deterministic under test.

use std::collections::{BTreeMap, HashMap};

use crate::layout::ZoneId;

/// Identifies one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer whose deadline has been reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub handle: TimerHandle,
    pub zone: ZoneId,
    pub deadline_ms: u64,
}

/// One-shot timers ordered by deadline, then by scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_seq: u64,
    pending: BTreeMap<(u64, u64), ZoneId>,
    deadlines: HashMap<TimerHandle, u64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule a callback for `zone` after `delay_ms`.
    pub fn schedule(&mut self, zone: ZoneId, delay_ms: u64) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.now_ms.saturating_add(delay_ms);
        let handle = TimerHandle(seq);
        self.pending.insert((deadline, seq), zone);
        self.deadlines.insert(handle, deadline);
        handle
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => {
                self.pending.remove(&(deadline, handle.0));
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock moves to the popped deadline, so anything scheduled while
    /// handling it is measured from the deadline rather than from `until_ms`.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerFired> {
        let (&(deadline, seq), _) = self.pending.iter().next()?;
        if deadline > until_ms {
            return None;
        }
        let zone = self.pending.remove(&(deadline, seq))?;
        let handle = TimerHandle(seq);
        self.deadlines.remove(&handle);
        self.now_ms = self.now_ms.max(deadline);
        Some(TimerFired {
            handle,
            zone,
            deadline_ms: deadline,
        })
    }

    /// Move the clock forward without firing anything. Never moves back.
    pub fn advance_clock(&mut self, to_ms: u64) {
        self.now_ms = self.now_ms.max(to_ms);
    }
}
