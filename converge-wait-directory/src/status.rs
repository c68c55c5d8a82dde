//! Status functions for Directory Service resources.
//!
//! Each status function is a fetch (through [`DirectoryServiceApi`]) joined
//! with a classifier that turns the fetched resource into a [`StateLabel`].
//! A resource whose status is `Deleted` is reported as absent, since the
//! service keeps returning deleted entities for a while after removal.

use crate::api::DirectoryServiceApi;
use crate::error::DirectoryResult;
use aws_sdk_directory::types::{
    DirectoryDescription, DirectoryStage, RegionDescription, ShareStatus, SharedDirectory,
};
use converge_wait_engine::{PollResult, StateLabel};
use futures::future::BoxFuture;

/// Boxed status function, ready to hand to [`converge_wait_engine::wait`].
pub type StatusFuture<'a, T> = BoxFuture<'a, DirectoryResult<PollResult<T>>>;

fn label(value: Option<&str>) -> StateLabel {
    StateLabel::from(value.unwrap_or_default())
}

pub fn region_state(region: &RegionDescription) -> StateLabel {
    label(region.status.as_ref().map(DirectoryStage::as_str))
}

pub fn shared_directory_state(shared: &SharedDirectory) -> StateLabel {
    label(shared.share_status.as_ref().map(ShareStatus::as_str))
}

pub fn directory_share_state(directory: &DirectoryDescription) -> StateLabel {
    label(directory.share_status.as_ref().map(ShareStatus::as_str))
}

fn region_exists(region: &RegionDescription) -> bool {
    !matches!(region.status, Some(DirectoryStage::Deleted))
}

fn share_exists(status: Option<&ShareStatus>) -> bool {
    !matches!(status, Some(ShareStatus::Deleted))
}

/// Status of one replicated region of a directory.
pub fn status_region<'a, A>(
    api: &'a A,
    directory_id: &'a str,
    region_name: &'a str,
) -> impl FnMut() -> StatusFuture<'a, RegionDescription> + 'a
where
    A: DirectoryServiceApi + ?Sized,
{
    move || {
        Box::pin(async move {
            let region = api
                .find_region(directory_id, region_name)
                .await?
                .filter(region_exists);
            Ok(PollResult::observe(region, region_state))
        })
    }
}

/// Status of a share, seen from the owning directory.
pub fn status_shared_directory<'a, A>(
    api: &'a A,
    owner_directory_id: &'a str,
    shared_directory_id: &'a str,
) -> impl FnMut() -> StatusFuture<'a, SharedDirectory> + 'a
where
    A: DirectoryServiceApi + ?Sized,
{
    move || {
        Box::pin(async move {
            let shared = api
                .find_shared_directory(owner_directory_id, shared_directory_id)
                .await?
                .filter(|shared| share_exists(shared.share_status.as_ref()));
            Ok(PollResult::observe(shared, shared_directory_state))
        })
    }
}

/// Share status of a directory shared into the calling account.
pub fn status_directory_share<'a, A>(
    api: &'a A,
    directory_id: &'a str,
) -> impl FnMut() -> StatusFuture<'a, DirectoryDescription> + 'a
where
    A: DirectoryServiceApi + ?Sized,
{
    move || {
        Box::pin(async move {
            let directory = api
                .find_directory(directory_id)
                .await?
                .filter(|directory| share_exists(directory.share_status.as_ref()));
            Ok(PollResult::observe(directory, directory_share_state))
        })
    }
}
