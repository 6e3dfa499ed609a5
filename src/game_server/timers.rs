//! Timers - Virtual timer queue owned by a race
//!
//! Every delayed or repeating piece of work a race schedules lives here.
//! Nothing runs on its own: the race pulls due timers while advancing its
//! clock, so clearing the queue is enough to cancel everything.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Work a timer performs when it comes due.
///
/// Declaration order is the dispatch order for timers due at the same
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// One second of race time elapsed
    RaceClock,
    /// Celebration delay after reaching the finish line
    FinishLine,
    /// Feedback delay after an answer; shows the next question
    NextQuestion,
    /// One second of question time elapsed
    QuestionClock,
    /// Speed boost pulse ends
    BoostEnd,
}

/// Handle used to cancel a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending {
    id: TimerId,
    due: Duration,
    kind: TimerKind,
}

impl Pending {
    fn order_key(&self) -> (Duration, TimerKind, u64) {
        (self.due, self.kind, self.id.0)
    }
}

/// A due timer handed back to the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub due: Duration,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    next_id: u64,
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: now + delay,
            kind,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Remove and return the earliest timer due at or before `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| p.order_key())
            .map(|(i, _)| i)?;

        let pending = self.pending.swap_remove(index);
        Some(Fired {
            due: pending.due,
            kind: pending.kind,
        })
    }

    #[cfg(test)]
    fn is_scheduled(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Number of timers waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
