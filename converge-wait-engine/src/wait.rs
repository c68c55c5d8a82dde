//! The poll loop.
//!
//! [`wait`] calls a status function until the observed state lands in the
//! spec's target set, leaves both the pending and target sets, the status
//! function fails, the deadline passes, or the caller cancels. Polls are
//! strictly sequential and every suspension point (the status call itself and
//! the sleep between polls) races against both cancellation and the deadline.

use crate::backoff::Backoff;
use crate::context::{deadline_after, WaitContext};
use crate::error::{BoxError, WaitError, WaitFailure, WaitResult};
use crate::spec::WaiterSpec;
use crate::state::{format_labels, Classification, StateLabel};
use std::future::Future;
use tokio::time::{sleep_until, Instant};

/// Outcome of one status-function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T> {
    /// The resource exists and reports `state`.
    Found { resource: T, state: StateLabel },
    /// The resource does not exist (or no longer exists).
    NotFound,
}

impl<T> PollResult<T> {
    pub fn found(resource: T, state: impl Into<StateLabel>) -> Self {
        Self::Found {
            resource,
            state: state.into(),
        }
    }

    /// Join a fetch result with a classifier that derives the state label
    /// from the fetched resource.
    pub fn observe(fetched: Option<T>, classify: impl FnOnce(&T) -> StateLabel) -> Self {
        match fetched {
            Some(resource) => {
                let state = classify(&resource);
                Self::Found { resource, state }
            }
            None => Self::NotFound,
        }
    }

    pub fn state(&self) -> Option<&StateLabel> {
        match self {
            Self::Found { state, .. } => Some(state),
            Self::NotFound => None,
        }
    }
}

/// Decision taken after a single observation.
#[derive(Debug)]
enum Verdict<T> {
    Converged(Option<T>),
    KeepPolling,
    Failed(WaitError),
}

/// Counters carried between polls of one wait.
#[derive(Debug)]
struct Tracker<'a, T> {
    spec: &'a WaiterSpec,
    consecutive_targets: u32,
    consecutive_not_found: u32,
    last_state: Option<StateLabel>,
    last_resource: Option<T>,
}

impl<'a, T> Tracker<'a, T> {
    fn new(spec: &'a WaiterSpec) -> Self {
        Self {
            spec,
            consecutive_targets: 0,
            consecutive_not_found: 0,
            last_state: None,
            last_resource: None,
        }
    }

    fn observe(&mut self, result: PollResult<T>) -> Verdict<T> {
        match result {
            PollResult::NotFound => {
                self.consecutive_not_found = self.consecutive_not_found.saturating_add(1);
                self.last_resource = None;
                if self.spec.waits_for_absence() {
                    return self.target_reached();
                }
                self.consecutive_targets = 0;
                if self.consecutive_not_found > self.spec.not_found_checks() {
                    return Verdict::Failed(WaitError::NotFound {
                        checks: self.consecutive_not_found,
                    });
                }
                Verdict::KeepPolling
            }
            PollResult::Found { resource, state } => {
                self.consecutive_not_found = 0;
                self.last_resource = Some(resource);
                let verdict = match self.spec.classify(&state) {
                    Classification::Target => self.target_reached(),
                    Classification::Pending => {
                        self.consecutive_targets = 0;
                        Verdict::KeepPolling
                    }
                    Classification::Unexpected => Verdict::Failed(WaitError::UnexpectedState {
                        state: state.clone(),
                        expected: self.expected(),
                    }),
                };
                self.last_state = Some(state);
                verdict
            }
        }
    }

    fn target_reached(&mut self) -> Verdict<T> {
        self.consecutive_targets = self.consecutive_targets.saturating_add(1);
        if self.consecutive_targets >= self.spec.required_consecutive_observations() {
            Verdict::Converged(self.last_resource.take())
        } else {
            Verdict::KeepPolling
        }
    }

    /// A target was seen but not yet often enough in a row.
    fn awaiting_confirmation(&self) -> bool {
        self.consecutive_targets > 0
    }

    fn expected(&self) -> Vec<StateLabel> {
        self.spec.target().iter().cloned().collect()
    }

    fn fail(&mut self, error: WaitError) -> WaitFailure<T> {
        WaitFailure {
            error,
            last_resource: self.last_resource.take(),
        }
    }

    fn timeout(&mut self) -> WaitFailure<T> {
        let error = WaitError::Timeout {
            timeout: self.spec.timeout(),
            last_state: self.last_state.clone(),
            expected: self.expected(),
        };
        self.fail(error)
    }

    fn cancelled(&mut self) -> WaitFailure<T> {
        let error = WaitError::Cancelled {
            last_state: self.last_state.clone(),
        };
        self.fail(error)
    }
}

/// Poll `status` until the resource converges on one of `spec`'s target states.
///
/// Returns the last fetched resource on success, or `None` when convergence
/// was signalled by the resource disappearing (empty target set).
///
/// # Errors
///
/// - [`WaitError::Fatal`] as soon as the status function returns an error.
/// - [`WaitError::UnexpectedState`] as soon as a state outside both sets is observed.
/// - [`WaitError::NotFound`] when a named target is expected but the resource
///   stays absent for more than the spec's not-found checks.
/// - [`WaitError::Timeout`] once the earlier of the spec timeout and the
///   context deadline passes.
/// - [`WaitError::Cancelled`] when the context's token fires.
pub async fn wait<T, E, F, Fut>(
    ctx: &WaitContext,
    spec: &WaiterSpec,
    status: F,
) -> WaitResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollResult<T>, E>>,
    E: Into<BoxError>,
{
    wait_with_snapshot(ctx, spec, status)
        .await
        .map_err(WaitFailure::into_error)
}

/// Same as [`wait`], but a failure also hands back the resource fetched by
/// the last poll so callers can inspect what the wait gave up on.
pub async fn wait_with_snapshot<T, E, F, Fut>(
    ctx: &WaitContext,
    spec: &WaiterSpec,
    mut status: F,
) -> Result<Option<T>, WaitFailure<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollResult<T>, E>>,
    E: Into<BoxError>,
{
    let start = Instant::now();
    let deadline = ctx.effective_deadline(start, spec.timeout());
    let cancel = ctx.cancellation_token();
    let mut tracker = Tracker::new(spec);
    let mut backoff = Backoff::new(spec);
    let mut attempt: u32 = 0;

    if cancel.is_cancelled() {
        return Err(tracker.cancelled());
    }

    log::debug!(
        "Waiting up to {:?} for target {} (pending {})",
        deadline.saturating_duration_since(start),
        format_labels(spec.target()),
        format_labels(spec.pending())
    );

    let mut pause = spec.delay();
    loop {
        if !pause.is_zero() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    log::debug!("Wait cancelled while sleeping after {attempt} polls");
                    return Err(tracker.cancelled());
                }
                () = sleep_until(deadline.min(deadline_after(Instant::now(), pause))) => {}
            }
        }

        if Instant::now() >= deadline {
            log::warn!(
                "Timed out after {attempt} polls waiting for {} (last state: {:?})",
                format_labels(spec.target()),
                tracker.last_state
            );
            return Err(tracker.timeout());
        }

        attempt = attempt.saturating_add(1);
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::debug!("Wait cancelled during poll {attempt}");
                return Err(tracker.cancelled());
            }
            () = sleep_until(deadline) => {
                log::warn!("Timed out during poll {attempt} (last state: {:?})", tracker.last_state);
                return Err(tracker.timeout());
            }
            result = status() => result,
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                let err = WaitError::fatal(e);
                log::warn!("Status check failed on poll {attempt}: {err}");
                return Err(tracker.fail(err));
            }
        };

        log::debug!(
            "Poll {attempt}: state {}",
            result.state().map_or("<not found>", StateLabel::as_str)
        );

        match tracker.observe(result) {
            Verdict::Converged(resource) => {
                log::info!(
                    "Converged after {attempt} polls in {:?}",
                    start.elapsed()
                );
                return Ok(resource);
            }
            Verdict::Failed(err) => {
                log::warn!("Wait failed on poll {attempt}: {err}");
                return Err(tracker.fail(err));
            }
            Verdict::KeepPolling => {}
        }

        pause = if tracker.awaiting_confirmation() {
            backoff.confirmation_interval()
        } else {
            backoff.next_interval()
        };
        log::debug!("Next poll in {pause:?}");
    }
}
