//! Scheduler error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
