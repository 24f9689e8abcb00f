//! Trailing-edge refresh debouncer, collapsing keystroke bursts into one file
//! list refresh.

use std::time::{Duration, Instant};

/// Trailing-edge timer
///
/// Every trigger pushes the deadline to `now + window`; the refresh fires once
/// the window passes with no further triggers. Triggers never queue.
#[derive(Debug, Clone)]
pub struct RefreshDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl RefreshDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a trigger, rescheduling any pending refresh.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns true exactly once per burst, when the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time until the pending refresh fires (for event loop timing)
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
