use thiserror::Error;

/// Errors that can occur during reminder entry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry exists for the given owner/subject.
    #[error("entry not found: {key}")]
    NotFound { key: String },

    /// The owner already has an entry with this subject.
    #[error("entry already exists: {key}")]
    DuplicateEntry { key: String },

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
