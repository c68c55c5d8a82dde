use converge_wait_engine::{SpecError, WaitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("Directory Service error: {0}")]
    ServiceError(String),
    #[error("Invalid waiter configuration: {0}")]
    InvalidSpec(#[from] SpecError),
    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl DirectoryError {
    /// The underlying wait failure, if the error came from the poll loop.
    pub fn as_wait_error(&self) -> Option<&WaitError> {
        match self {
            Self::Wait(e) => Some(e),
            _ => None,
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
