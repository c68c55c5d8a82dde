//! Blocking waits for asynchronous Directory Service operations.
//!
//! Each wait pairs one spec from [`crate::specs`] with one status function
//! from [`crate::status`] and hands both to the engine.

use crate::api::DirectoryServiceApi;
use crate::error::DirectoryResult;
use crate::{specs, status};
use aws_sdk_directory::types::{DirectoryDescription, RegionDescription, SharedDirectory};
use converge_wait_engine::{wait, WaitContext};
use std::time::Duration;

/// Wait for a newly added region to become `Active`.
pub async fn wait_region_created<A>(
    ctx: &WaitContext,
    api: &A,
    directory_id: &str,
    region_name: &str,
    timeout: Duration,
) -> DirectoryResult<Option<RegionDescription>>
where
    A: DirectoryServiceApi + ?Sized,
{
    let spec = specs::region_created(timeout)?;
    log::info!("Waiting for region {region_name} of directory {directory_id} to become active");
    let region = wait(ctx, &spec, status::status_region(api, directory_id, region_name)).await?;
    Ok(region)
}

/// Wait for a removed region to disappear.
pub async fn wait_region_deleted<A>(
    ctx: &WaitContext,
    api: &A,
    directory_id: &str,
    region_name: &str,
    timeout: Duration,
) -> DirectoryResult<Option<RegionDescription>>
where
    A: DirectoryServiceApi + ?Sized,
{
    let spec = specs::region_deleted(timeout)?;
    log::info!("Waiting for region {region_name} of directory {directory_id} to be deleted");
    let region = wait(ctx, &spec, status::status_region(api, directory_id, region_name)).await?;
    Ok(region)
}

/// Wait for an unshared directory to disappear from its owner's share list.
pub async fn wait_shared_directory_deleted<A>(
    ctx: &WaitContext,
    api: &A,
    owner_directory_id: &str,
    shared_directory_id: &str,
    timeout: Duration,
) -> DirectoryResult<Option<SharedDirectory>>
where
    A: DirectoryServiceApi + ?Sized,
{
    let spec = specs::shared_directory_deleted(timeout)?;
    log::info!(
        "Waiting for share {shared_directory_id} of directory {owner_directory_id} to be deleted"
    );
    let shared = wait(
        ctx,
        &spec,
        status::status_shared_directory(api, owner_directory_id, shared_directory_id),
    )
    .await?;
    Ok(shared)
}

/// Wait for a directory shared into this account to settle on `Shared`.
pub async fn wait_directory_shared<A>(
    ctx: &WaitContext,
    api: &A,
    directory_id: &str,
    timeout: Duration,
) -> DirectoryResult<Option<DirectoryDescription>>
where
    A: DirectoryServiceApi + ?Sized,
{
    let spec = specs::directory_shared(timeout)?;
    log::info!("Waiting for directory {directory_id} to be shared");
    let directory = wait(ctx, &spec, status::status_directory_share(api, directory_id)).await?;
    Ok(directory)
}
