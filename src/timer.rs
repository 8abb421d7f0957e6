use std::time::{Duration, Instant};

/// Single-slot trailing-edge timer. Arming it while a deadline is pending
/// cancels that deadline and starts a fresh one, so at most one invocation
/// is ever outstanding. Used both for debounced input handling and for the
/// self-clearing success message.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer to fire `delay` after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once per armed deadline, the first time it is
    /// polled at or past that deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
