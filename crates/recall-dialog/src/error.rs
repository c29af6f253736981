use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogError {
    /// The store failed for a reason other than a missing or duplicate entry.
    #[error("store error: {0}")]
    Store(#[from] recall_store::StoreError),
}

pub type Result<T> = std::result::Result<T, DialogError>;
