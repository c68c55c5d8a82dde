//! Read-side seam over the Directory Service API.
//!
//! Each lookup returns `Ok(None)` when the service reports the entity does not
//! exist, so status functions can treat disappearance as an observation rather
//! than an error.

use crate::error::DirectoryResult;
use async_trait::async_trait;
use aws_sdk_directory::types::{DirectoryDescription, RegionDescription, SharedDirectory};

#[async_trait]
pub trait DirectoryServiceApi: Send + Sync {
    /// Describe one replicated region of a directory.
    async fn find_region(
        &self,
        directory_id: &str,
        region_name: &str,
    ) -> DirectoryResult<Option<RegionDescription>>;

    /// Describe a share from the owner account's side.
    async fn find_shared_directory(
        &self,
        owner_directory_id: &str,
        shared_directory_id: &str,
    ) -> DirectoryResult<Option<SharedDirectory>>;

    /// Describe a directory, including its share status when it was shared into this account.
    async fn find_directory(&self, directory_id: &str)
        -> DirectoryResult<Option<DirectoryDescription>>;
}
