//! Waiter configurations for Directory Service operations.
//!
//! Labels are the service's own wire values for `DirectoryStage` and `ShareStatus`.

use aws_sdk_directory::types::{DirectoryStage, ShareStatus};
use converge_wait_engine::{SpecError, WaiterSpec};
use std::time::Duration;

/// Deleting a share is slow to settle; polling faster than this only burns API quota.
pub const SHARE_DELETION_MIN_INTERVAL: Duration = Duration::from_secs(30);

/// A newly added region is usable once it reports `Active`.
pub fn region_created(timeout: Duration) -> Result<WaiterSpec, SpecError> {
    WaiterSpec::builder(timeout)
        .pending([
            DirectoryStage::Requested.as_str(),
            DirectoryStage::Creating.as_str(),
            DirectoryStage::Created.as_str(),
        ])
        .target([DirectoryStage::Active.as_str()])
        .build()
}

/// A removed region is gone once it can no longer be described.
pub fn region_deleted(timeout: Duration) -> Result<WaiterSpec, SpecError> {
    WaiterSpec::builder(timeout)
        .pending([
            DirectoryStage::Active.as_str(),
            DirectoryStage::Deleting.as_str(),
        ])
        .build()
}

/// An unshared directory disappears from the owner's share list. The share
/// can briefly vanish and reappear, so absence must be seen twice in a row.
pub fn shared_directory_deleted(timeout: Duration) -> Result<WaiterSpec, SpecError> {
    WaiterSpec::builder(timeout)
        .pending([
            ShareStatus::Deleting.as_str(),
            ShareStatus::Shared.as_str(),
            ShareStatus::PendingAcceptance.as_str(),
            ShareStatus::RejectFailed.as_str(),
            ShareStatus::Rejected.as_str(),
            ShareStatus::Rejecting.as_str(),
        ])
        .min_interval(SHARE_DELETION_MIN_INTERVAL)
        .required_consecutive_observations(2)
        .build()
}

/// An accepted share settles on `Shared`; it must be seen twice in a row.
pub fn directory_shared(timeout: Duration) -> Result<WaiterSpec, SpecError> {
    WaiterSpec::builder(timeout)
        .pending([
            ShareStatus::PendingAcceptance.as_str(),
            ShareStatus::Sharing.as_str(),
        ])
        .target([ShareStatus::Shared.as_str()])
        .required_consecutive_observations(2)
        .build()
}
