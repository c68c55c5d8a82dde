//! Directory waiter service layer
//!
//! Holds an AWS Directory Service client and exposes the four waits so that
//! adapters (the CLI) never touch SDK configuration themselves.

use crate::client::AwsDirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::waiters;
use aws_sdk_directory::types::{DirectoryDescription, RegionDescription, SharedDirectory};
use aws_sdk_directory::Client as DirectoryClient;
use converge_wait_engine::WaitContext;
use std::time::Duration;

/// Main service struct that owns the Directory Service client
pub struct DirectoryWaiterService {
    api: AwsDirectoryClient,
}

impl DirectoryWaiterService {
    /// Create a new service instance with an AWS Directory Service client
    ///
    /// The configuration is loaded using the default credential provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error if no AWS region could be resolved.
    pub async fn new() -> DirectoryResult<Self> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        if config.region().is_none() {
            return Err(DirectoryError::ConfigError(
                "no AWS region configured (set AWS_REGION or a profile region)".to_string(),
            ));
        }

        Ok(Self {
            api: AwsDirectoryClient::new(DirectoryClient::new(&config)),
        })
    }

    pub async fn region_created(
        &self,
        ctx: &WaitContext,
        directory_id: &str,
        region_name: &str,
        timeout: Duration,
    ) -> DirectoryResult<Option<RegionDescription>> {
        waiters::wait_region_created(ctx, &self.api, directory_id, region_name, timeout).await
    }

    pub async fn region_deleted(
        &self,
        ctx: &WaitContext,
        directory_id: &str,
        region_name: &str,
        timeout: Duration,
    ) -> DirectoryResult<Option<RegionDescription>> {
        waiters::wait_region_deleted(ctx, &self.api, directory_id, region_name, timeout).await
    }

    pub async fn shared_directory_deleted(
        &self,
        ctx: &WaitContext,
        owner_directory_id: &str,
        shared_directory_id: &str,
        timeout: Duration,
    ) -> DirectoryResult<Option<SharedDirectory>> {
        waiters::wait_shared_directory_deleted(
            ctx,
            &self.api,
            owner_directory_id,
            shared_directory_id,
            timeout,
        )
        .await
    }

    pub async fn directory_shared(
        &self,
        ctx: &WaitContext,
        directory_id: &str,
        timeout: Duration,
    ) -> DirectoryResult<Option<DirectoryDescription>> {
        waiters::wait_directory_shared(ctx, &self.api, directory_id, timeout).await
    }
}
