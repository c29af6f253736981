use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The store could not be read while resuming or firing.
    #[error("Store error: {0}")]
    Store(#[from] recall_store::StoreError),

    /// The configured interval sequence is unusable.
    #[error("Invalid intervals: {0}")]
    InvalidIntervals(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
