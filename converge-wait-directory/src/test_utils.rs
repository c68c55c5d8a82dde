//! Test utilities: a scripted in-memory [`DirectoryServiceApi`] and resource fixtures.

use crate::api::DirectoryServiceApi;
use crate::error::{DirectoryError, DirectoryResult};
use async_trait::async_trait;
use aws_sdk_directory::types::{DirectoryDescription, RegionDescription, SharedDirectory};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Sample resources as the service would describe them.
pub mod fixtures {
    use aws_sdk_directory::types::{
        DirectoryDescription, DirectoryStage, RegionDescription, ShareStatus, SharedDirectory,
    };

    pub const DIRECTORY_ID: &str = "d-1234567890";
    pub const SHARED_DIRECTORY_ID: &str = "d-0987654321";
    pub const REGION_NAME: &str = "us-west-2";

    pub fn region(stage: DirectoryStage) -> RegionDescription {
        RegionDescription::builder()
            .directory_id(DIRECTORY_ID)
            .region_name(REGION_NAME)
            .status(stage)
            .build()
    }

    pub fn shared_directory(status: ShareStatus) -> SharedDirectory {
        SharedDirectory::builder()
            .owner_directory_id(DIRECTORY_ID)
            .shared_directory_id(SHARED_DIRECTORY_ID)
            .share_status(status)
            .build()
    }

    pub fn directory(status: ShareStatus) -> DirectoryDescription {
        DirectoryDescription::builder()
            .directory_id(SHARED_DIRECTORY_ID)
            .share_status(status)
            .build()
    }
}

/// Responses replayed in order; the last one repeats once the script runs out.
#[derive(Debug)]
struct Script<T> {
    responses: Mutex<VecDeque<Option<T>>>,
}

impl<T: Clone> Script<T> {
    fn new(responses: Vec<Option<T>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    fn next(&self) -> Option<T> {
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        if responses.len() > 1 {
            responses.pop_front().flatten()
        } else {
            responses.front().cloned().flatten()
        }
    }
}

impl<T: Clone> Default for Script<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// In-memory Directory Service double. `None` entries in a script mean
/// "entity does not exist".
#[derive(Debug, Default)]
pub struct FakeDirectoryApi {
    regions: Script<RegionDescription>,
    shared_directories: Script<SharedDirectory>,
    directories: Script<DirectoryDescription>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl FakeDirectoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_regions(mut self, responses: Vec<Option<RegionDescription>>) -> Self {
        self.regions = Script::new(responses);
        self
    }

    #[must_use]
    pub fn with_shared_directories(mut self, responses: Vec<Option<SharedDirectory>>) -> Self {
        self.shared_directories = Script::new(responses);
        self
    }

    #[must_use]
    pub fn with_directories(mut self, responses: Vec<Option<DirectoryDescription>>) -> Self {
        self.directories = Script::new(responses);
        self
    }

    /// Every call fails with a service error carrying `message`.
    #[must_use]
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of describe calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond<T: Clone>(&self, script: &Script<T>) -> DirectoryResult<Option<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(DirectoryError::ServiceError(message.clone())),
            None => Ok(script.next()),
        }
    }
}

#[async_trait]
impl DirectoryServiceApi for FakeDirectoryApi {
    async fn find_region(
        &self,
        _directory_id: &str,
        _region_name: &str,
    ) -> DirectoryResult<Option<RegionDescription>> {
        self.respond(&self.regions)
    }

    async fn find_shared_directory(
        &self,
        _owner_directory_id: &str,
        _shared_directory_id: &str,
    ) -> DirectoryResult<Option<SharedDirectory>> {
        self.respond(&self.shared_directories)
    }

    async fn find_directory(
        &self,
        _directory_id: &str,
    ) -> DirectoryResult<Option<DirectoryDescription>> {
        self.respond(&self.directories)
    }
}
