use std::time::Duration;

use tokio::time::Instant;

/// Quiet-period tracker.
///
/// Each recorded event pushes the single pending deadline to
/// `event time + threshold`; [`Debouncer::fire`] reports whether that
/// deadline has passed and clears it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: Duration,
    deadline: Option<Instant>,
    superseded: u64,
}

impl Debouncer {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            deadline: None,
            superseded: 0,
        }
    }

    pub fn record(&mut self, at: Instant) {
        if self.deadline.is_some() {
            self.superseded += 1;
        }
        self.deadline = Some(at + self.threshold);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Events dropped because a newer one arrived inside the quiet period.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
