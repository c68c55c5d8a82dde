//! Cancellation and deadline carrier handed to every wait.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stand-in for "no deadline" when `start + timeout` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + timeout`, clamped to a far-future instant instead of overflowing.
pub(crate) fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Caller-owned signal that bounds a wait from the outside.
///
/// Cancelling the token ends the wait with [`WaitError::Cancelled`](crate::WaitError::Cancelled).
/// Reaching the deadline ends it with [`WaitError::Timeout`](crate::WaitError::Timeout),
/// the same as exhausting the spec's own timeout.
#[derive(Debug, Clone, Default)]
pub struct WaitContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl WaitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(deadline_after(Instant::now(), timeout))
    }

    /// A context whose token is cancelled with this one, but can also be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The earlier of this context's deadline and `start + timeout`.
    pub(crate) fn effective_deadline(&self, start: Instant, timeout: Duration) -> Instant {
        let own = deadline_after(start, timeout);
        self.deadline.map_or(own, |deadline| deadline.min(own))
    }
}
