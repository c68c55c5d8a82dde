//! State labels reported by status functions and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque label for a coarse lifecycle stage of a remote resource
/// (for example `Creating`, `Active` or `PendingAcceptance`).
///
/// Labels carry no ordering semantics; the engine only checks set membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateLabel(String);

impl StateLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StateLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for StateLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl PartialEq<str> for StateLabel {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Where an observed state falls relative to a [`WaiterSpec`](crate::WaiterSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The resource has converged on a desired state.
    Target,
    /// The operation is still in progress.
    Pending,
    /// Neither pending nor target: the resource went somewhere the caller did not anticipate.
    Unexpected,
}

/// Render a set of labels as `[A, B, C]` for error messages.
pub(crate) fn format_labels<'a>(labels: impl IntoIterator<Item = &'a StateLabel>) -> String {
    let joined = labels
        .into_iter()
        .map(StateLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}
