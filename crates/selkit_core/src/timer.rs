//! Cancellable one-shot timers on a virtual clock
//!
//! The queue never reads the wall clock. The platform layer calls
//! [`TimerQueue::update`] with its frame time (or a test with any time it
//! likes) and gets back the timers that expired, in deadline order.
//!
//! ```rust
//! use selkit_core::timer::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let open = timers.schedule(700);
//! assert!(timers.update(699).is_empty());
//! assert_eq!(timers.update(700), vec![open]);
//! assert_eq!(timers.pending_count(), 0);
//! ```

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

#[derive(Debug)]
struct Timer {
    deadline_ms: u64,
    /// Tie-breaker so equal deadlines fire in scheduling order
    seq: u64,
}

/// Pending timers keyed by generational handles
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: SlotMap<TimerId, Timer>,
    now_ms: u64,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the last `update`
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a timer `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: u64) -> TimerId {
        let deadline_ms = self.now_ms.saturating_add(delay_ms);
        let seq = self.seq;
        self.seq += 1;
        let id = self.timers.insert(Timer { deadline_ms, seq });
        tracing::trace!(?id, deadline_ms, "timer scheduled");
        id
    }

    /// Cancel a pending timer, returning whether it was still pending
    ///
    /// Cancelling a fired or already-cancelled timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let cancelled = self.timers.remove(id).is_some();
        if cancelled {
            tracing::trace!(?id, "timer cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending deadline, for platforms that sleep until it
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|timer| timer.deadline_ms).min()
    }

    /// Advance the clock and remove every timer due by `now_ms`
    ///
    /// The clock never moves backwards; an earlier `now_ms` is ignored.
    pub fn update(&mut self, now_ms: u64) -> Vec<TimerId> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;

        let mut due: Vec<(u64, u64, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline_ms <= now)
            .map(|(id, timer)| (timer.deadline_ms, timer.seq, id))
            .collect();
        due.sort_unstable_by_key(|&(deadline, seq, _)| (deadline, seq));

        due.into_iter()
            .map(|(_, _, id)| {
                self.timers.remove(id);
                tracing::trace!(?id, now_ms = now, "timer fired");
                id
            })
            .collect()
    }

    /// Drop every pending timer, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut timers = TimerQueue::new();
        let late = timers.schedule(300);
        let early = timers.schedule(100);
        let tie = timers.schedule(100);

        assert_eq!(timers.next_deadline(), Some(100));
        assert_eq!(timers.update(500), vec![early, tie, late]);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(10);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.update(100).is_empty());
    }

    #[test]
    fn test_delay_counts_from_last_update() {
        let mut timers = TimerQueue::new();
        timers.update(1_000);
        let id = timers.schedule(150);
        assert!(timers.update(1_149).is_empty());
        assert!(timers.is_pending(id));
        assert_eq!(timers.update(1_150), vec![id]);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut timers = TimerQueue::new();
        timers.update(500);
        timers.update(100);
        assert_eq!(timers.now_ms(), 500);
    }
}
