use recall_core::{OwnerId, ReminderEntry};

use crate::error::Result;

/// Durable subject/owner/note rows.
///
/// Shared by the scheduler and the dialog layer; implementations must
/// tolerate concurrent callers and external deletion at any time.
pub trait ReminderStore: Send + Sync {
    /// Insert a new entry. Fails with `DuplicateEntry` if the owner already
    /// has this subject.
    fn store(&self, subject: &str, owner: OwnerId, note: Option<&str>) -> Result<()>;

    /// Return the entry's note (`None` when it was skipped). Fails with
    /// `NotFound` if the entry is absent.
    fn fetch(&self, subject: &str, owner: OwnerId) -> Result<Option<String>>;

    /// Delete the entry. Succeeds when it is already gone.
    fn remove(&self, subject: &str, owner: OwnerId) -> Result<()>;

    /// The owner's subjects in insertion order.
    fn list_subjects(&self, owner: OwnerId) -> Result<Vec<String>>;

    /// Every persisted entry across all owners, in insertion order.
    ///
    /// Rows that cannot be decoded are logged and left out.
    fn entries(&self) -> Result<Vec<ReminderEntry>>;
}
