//! Interval schedule between polls.

use crate::spec::WaiterSpec;
use std::time::Duration;

/// Doubling interval that starts at the spec's minimum and is capped at its
/// maximum. A fixed poll interval on the spec replaces the schedule entirely.
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    current: Duration,
    max: Duration,
    fixed: Option<Duration>,
}

impl Backoff {
    pub fn new(spec: &WaiterSpec) -> Self {
        Self {
            min: spec.min_interval(),
            current: spec.min_interval(),
            max: spec.max_interval().max(spec.min_interval()),
            fixed: spec.poll_interval(),
        }
    }

    /// The interval to sleep before the next poll.
    pub fn next_interval(&mut self) -> Duration {
        if let Some(fixed) = self.fixed {
            return fixed;
        }
        let interval = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        interval
    }

    /// The interval to sleep before re-checking an unconfirmed target
    /// observation. Does not advance the schedule.
    pub fn confirmation_interval(&self) -> Duration {
        self.fixed.unwrap_or(self.min)
    }
}
