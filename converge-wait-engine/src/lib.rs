//! This crate provides a convergence waiter for eventually-consistent remote resources:
//! - Declarative wait configuration (pending/target state sets, timeout, poll interval)
//! - A cancellable, deadline-bounded poll loop with bounded exponential backoff
//! - Flap suppression through repeated target observations
//!

mod backoff;
mod context;
mod error;
mod spec;
mod state;
mod wait;

// Re-exports for a small, focused public API
pub use backoff::Backoff;
pub use context::WaitContext;
pub use error::{BoxError, SpecError, WaitError, WaitFailure, WaitResult};
pub use spec::{
    WaiterSpec, WaiterSpecBuilder, DEFAULT_MAX_INTERVAL, DEFAULT_MIN_INTERVAL,
    DEFAULT_NOT_FOUND_CHECKS,
};
pub use state::{Classification, StateLabel};
pub use tokio_util::sync::CancellationToken;
pub use wait::{wait, wait_with_snapshot, PollResult};
