//! Declarative description of a single convergence wait.

use crate::error::SpecError;
use crate::state::{Classification, StateLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Floor on the delay between polls when the caller does not set one.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Ceiling for the exponential backoff between polls.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10);

/// Consecutive "not found" polls tolerated while waiting for a named target state.
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Immutable configuration for one wait: which states mean "keep polling",
/// which mean "done", and how long and how often to poll.
///
/// Construct with [`WaiterSpec::builder`]; the builder enforces the invariants
/// (`pending` and `target` disjoint, at least one required observation).
/// An empty `target` set means the wait converges when the resource disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWaiterSpec", into = "RawWaiterSpec")]
pub struct WaiterSpec {
    pending: BTreeSet<StateLabel>,
    target: BTreeSet<StateLabel>,
    timeout: Duration,
    delay: Duration,
    min_interval: Duration,
    max_interval: Duration,
    poll_interval: Option<Duration>,
    required_consecutive_observations: u32,
    not_found_checks: u32,
}

impl WaiterSpec {
    /// Start building a spec that gives up after `timeout`.
    pub fn builder(timeout: Duration) -> WaiterSpecBuilder {
        WaiterSpecBuilder::new(timeout)
    }

    pub fn pending(&self) -> &BTreeSet<StateLabel> {
        &self.pending
    }

    pub fn target(&self) -> &BTreeSet<StateLabel> {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay before the first poll.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Fixed interval between polls, overriding the backoff schedule.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    pub fn required_consecutive_observations(&self) -> u32 {
        self.required_consecutive_observations
    }

    pub fn not_found_checks(&self) -> u32 {
        self.not_found_checks
    }

    /// True when convergence is signalled by the resource disappearing.
    pub fn waits_for_absence(&self) -> bool {
        self.target.is_empty()
    }

    /// Place an observed state in the pending/target/unexpected partition.
    pub fn classify(&self, state: &StateLabel) -> Classification {
        if self.target.contains(state) {
            Classification::Target
        } else if self.pending.contains(state) {
            Classification::Pending
        } else {
            Classification::Unexpected
        }
    }

    /// Check the invariants a spec must hold before it can drive a wait.
    pub fn validate(&self) -> Result<(), SpecError> {
        let overlap: Vec<StateLabel> = self.pending.intersection(&self.target).cloned().collect();
        if !overlap.is_empty() {
            return Err(SpecError::OverlappingStates { states: overlap });
        }
        if self.required_consecutive_observations == 0 {
            return Err(SpecError::ZeroConsecutiveObservations);
        }
        if self.not_found_checks == 0 {
            return Err(SpecError::ZeroNotFoundChecks);
        }
        if self.timeout.is_zero() {
            return Err(SpecError::ZeroTimeout);
        }
        if self.min_interval.is_zero() || self.poll_interval.is_some_and(|d| d.is_zero()) {
            return Err(SpecError::ZeroInterval);
        }
        if self.min_interval > self.max_interval {
            return Err(SpecError::IntervalBounds {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }
}

/// Builder for [`WaiterSpec`].
#[derive(Debug, Clone)]
pub struct WaiterSpecBuilder {
    spec: WaiterSpec,
}

impl WaiterSpecBuilder {
    fn new(timeout: Duration) -> Self {
        Self {
            spec: WaiterSpec {
                pending: BTreeSet::new(),
                target: BTreeSet::new(),
                timeout,
                delay: Duration::ZERO,
                min_interval: DEFAULT_MIN_INTERVAL,
                max_interval: DEFAULT_MAX_INTERVAL,
                poll_interval: None,
                required_consecutive_observations: 1,
                not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            },
        }
    }

    pub fn pending<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateLabel>,
    {
        self.spec.pending.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn target<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateLabel>,
    {
        self.spec.target.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.spec.delay = delay;
        self
    }

    /// Raises the max interval too if it would otherwise fall below the new floor.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.spec.min_interval = interval;
        self.spec.max_interval = self.spec.max_interval.max(interval);
        self
    }

    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.spec.max_interval = interval;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.spec.poll_interval = Some(interval);
        self
    }

    pub fn required_consecutive_observations(mut self, count: u32) -> Self {
        self.spec.required_consecutive_observations = count;
        self
    }

    pub fn not_found_checks(mut self, count: u32) -> Self {
        self.spec.not_found_checks = count;
        self
    }

    /// Validate and return the finished spec.
    pub fn build(self) -> Result<WaiterSpec, SpecError> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}

fn default_min_interval_ms() -> u64 {
    duration_to_ms(DEFAULT_MIN_INTERVAL)
}

fn default_max_interval_ms() -> u64 {
    duration_to_ms(DEFAULT_MAX_INTERVAL)
}

fn default_required_observations() -> u32 {
    1
}

fn default_not_found_checks() -> u32 {
    DEFAULT_NOT_FOUND_CHECKS
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Wire form of [`WaiterSpec`]; durations are whole milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWaiterSpec {
    #[serde(default)]
    pending: BTreeSet<StateLabel>,
    #[serde(default)]
    target: BTreeSet<StateLabel>,
    timeout_ms: u64,
    #[serde(default)]
    delay_ms: u64,
    #[serde(default = "default_min_interval_ms")]
    min_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    max_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll_interval_ms: Option<u64>,
    #[serde(default = "default_required_observations")]
    required_consecutive_observations: u32,
    #[serde(default = "default_not_found_checks")]
    not_found_checks: u32,
}

impl TryFrom<RawWaiterSpec> for WaiterSpec {
    type Error = SpecError;

    fn try_from(raw: RawWaiterSpec) -> Result<Self, Self::Error> {
        let spec = WaiterSpec {
            pending: raw.pending,
            target: raw.target,
            timeout: Duration::from_millis(raw.timeout_ms),
            delay: Duration::from_millis(raw.delay_ms),
            min_interval: Duration::from_millis(raw.min_interval_ms),
            max_interval: Duration::from_millis(raw.max_interval_ms),
            poll_interval: raw.poll_interval_ms.map(Duration::from_millis),
            required_consecutive_observations: raw.required_consecutive_observations,
            not_found_checks: raw.not_found_checks,
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl From<WaiterSpec> for RawWaiterSpec {
    fn from(spec: WaiterSpec) -> Self {
        Self {
            pending: spec.pending,
            target: spec.target,
            timeout_ms: duration_to_ms(spec.timeout),
            delay_ms: duration_to_ms(spec.delay),
            min_interval_ms: duration_to_ms(spec.min_interval),
            max_interval_ms: duration_to_ms(spec.max_interval),
            poll_interval_ms: spec.poll_interval.map(duration_to_ms),
            required_consecutive_observations: spec.required_consecutive_observations,
            not_found_checks: spec.not_found_checks,
        }
    }
}
