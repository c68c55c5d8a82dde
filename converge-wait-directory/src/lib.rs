//! This crate provides blocking waits for asynchronous AWS Directory Service operations:
//! - Region replication (creation and deletion)
//! - Directory sharing (share acceptance and share deletion)
//!
//! Every wait is one declarative [`WaiterSpec`](converge_wait_engine::WaiterSpec)
//! plus one status function, driven by `converge-wait-engine`.

mod api;
mod client;
mod error;
mod service;
pub mod specs;
pub mod status;
mod waiters;

// Test utilities are available in both unit tests and integration tests
#[cfg(any(test, feature = "integ-test"))]
pub mod test_utils;

pub use api::DirectoryServiceApi;
pub use client::AwsDirectoryClient;
pub use error::{DirectoryError, DirectoryResult};
pub use service::DirectoryWaiterService;
pub use waiters::{
    wait_directory_shared, wait_region_created, wait_region_deleted,
    wait_shared_directory_deleted,
};

// Callers need these to build contexts and inspect failures.
pub use converge_wait_engine::{CancellationToken, WaitContext, WaitError};
