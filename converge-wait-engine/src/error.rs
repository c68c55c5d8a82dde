//! Error types for spec validation and for waits that fail to converge.

use crate::state::{format_labels, StateLabel};
use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by a status function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A [`WaiterSpec`](crate::WaiterSpec) that violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("states {} are both pending and target", format_labels(.states))]
    OverlappingStates { states: Vec<StateLabel> },

    #[error("required consecutive observations must be at least 1")]
    ZeroConsecutiveObservations,

    #[error("not-found checks must be at least 1")]
    ZeroNotFoundChecks,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("minimum interval {min:?} exceeds maximum interval {max:?}")]
    IntervalBounds { min: Duration, max: Duration },
}

/// Why a wait ended without converging.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The status function failed; such errors are never retried.
    #[error("status check failed: {source}")]
    Fatal {
        #[source]
        source: BoxError,
    },

    /// The resource reported a state outside both the pending and target sets.
    #[error("unexpected state '{state}', wanted target {}", format_labels(.expected))]
    UnexpectedState {
        state: StateLabel,
        expected: Vec<StateLabel>,
    },

    /// The deadline passed while the resource was still converging.
    #[error(
        "timeout while waiting for state to become {} (last state: '{}', timeout: {timeout:?})",
        format_labels(.expected),
        .last_state.as_ref().map_or("<none>", StateLabel::as_str)
    )]
    Timeout {
        timeout: Duration,
        last_state: Option<StateLabel>,
        expected: Vec<StateLabel>,
    },

    /// The caller cancelled the wait.
    #[error(
        "wait cancelled (last state: '{}')",
        .last_state.as_ref().map_or("<none>", StateLabel::as_str)
    )]
    Cancelled { last_state: Option<StateLabel> },

    /// A named target state was expected but the resource kept reporting absence.
    #[error("couldn't find resource ({checks} retries)")]
    NotFound { checks: u32 },
}

impl WaitError {
    pub(crate) fn fatal(source: impl Into<BoxError>) -> Self {
        Self::Fatal {
            source: source.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The last state observed before the wait ended, where one is known.
    pub fn last_state(&self) -> Option<&StateLabel> {
        match self {
            Self::UnexpectedState { state, .. } => Some(state),
            Self::Timeout { last_state, .. } | Self::Cancelled { last_state } => {
                last_state.as_ref()
            }
            Self::Fatal { .. } | Self::NotFound { .. } => None,
        }
    }
}

pub type WaitResult<T> = Result<T, WaitError>;

/// A [`WaitError`] together with the resource fetched by the last poll.
///
/// `last_resource` is `None` when the wait ended before any poll, or when the
/// last poll reported the resource as not found.
#[derive(Debug)]
pub struct WaitFailure<T> {
    pub error: WaitError,
    pub last_resource: Option<T>,
}

impl<T> WaitFailure<T> {
    pub fn into_error(self) -> WaitError {
        self.error
    }
}

impl<T> From<WaitFailure<T>> for WaitError {
    fn from(failure: WaitFailure<T>) -> Self {
        failure.error
    }
}
