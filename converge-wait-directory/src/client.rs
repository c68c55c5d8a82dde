//! AWS Directory Service client wrapper for the describe calls the waiters poll.

use crate::api::DirectoryServiceApi;
use crate::error::{DirectoryError, DirectoryResult};
use async_trait::async_trait;
use aws_sdk_directory::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_directory::types::{DirectoryDescription, RegionDescription, SharedDirectory};
use aws_sdk_directory::Client as DirectoryClient;

/// Error codes the service uses when the described entity is gone.
const NOT_FOUND_CODES: &[&str] = &[
    "EntityDoesNotExistException",
    "DirectoryDoesNotExistException",
];

pub struct AwsDirectoryClient {
    client: DirectoryClient,
}

impl AwsDirectoryClient {
    pub fn new(client: DirectoryClient) -> Self {
        Self { client }
    }
}

fn is_not_found<E: ProvideErrorMetadata, R>(err: &SdkError<E, R>) -> bool {
    err.as_service_error()
        .and_then(|e| e.code())
        .is_some_and(|code| NOT_FOUND_CODES.contains(&code))
}

fn service_error<E, R>(operation: &str, err: SdkError<E, R>) -> DirectoryError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    DirectoryError::ServiceError(format!(
        "Failed to {operation}: {}",
        DisplayErrorContext(&err)
    ))
}

#[async_trait]
impl DirectoryServiceApi for AwsDirectoryClient {
    async fn find_region(
        &self,
        directory_id: &str,
        region_name: &str,
    ) -> DirectoryResult<Option<RegionDescription>> {
        let response = self
            .client
            .describe_regions()
            .directory_id(directory_id)
            .region_name(region_name)
            .send()
            .await;

        match response {
            Ok(output) => Ok(output
                .regions_description
                .unwrap_or_default()
                .into_iter()
                .next()),
            Err(e) if is_not_found(&e) => {
                log::debug!("Directory {directory_id} has no region {region_name}");
                Ok(None)
            }
            Err(e) => Err(service_error("describe regions", e)),
        }
    }

    async fn find_shared_directory(
        &self,
        owner_directory_id: &str,
        shared_directory_id: &str,
    ) -> DirectoryResult<Option<SharedDirectory>> {
        let response = self
            .client
            .describe_shared_directories()
            .owner_directory_id(owner_directory_id)
            .shared_directory_ids(shared_directory_id)
            .send()
            .await;

        match response {
            Ok(output) => Ok(output
                .shared_directories
                .unwrap_or_default()
                .into_iter()
                .next()),
            Err(e) if is_not_found(&e) => {
                log::debug!(
                    "Shared directory {shared_directory_id} of {owner_directory_id} not found"
                );
                Ok(None)
            }
            Err(e) => Err(service_error("describe shared directories", e)),
        }
    }

    async fn find_directory(
        &self,
        directory_id: &str,
    ) -> DirectoryResult<Option<DirectoryDescription>> {
        let response = self
            .client
            .describe_directories()
            .directory_ids(directory_id)
            .send()
            .await;

        match response {
            Ok(output) => Ok(output
                .directory_descriptions
                .unwrap_or_default()
                .into_iter()
                .next()),
            Err(e) if is_not_found(&e) => {
                log::debug!("Directory {directory_id} not found");
                Ok(None)
            }
            Err(e) => Err(service_error("describe directories", e)),
        }
    }
}
