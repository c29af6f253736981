//! Reminder records shared between the store, the scheduler and notification sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OwnerId, ReminderKey};

/// A persisted subject/owner/note row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub owner: OwnerId,
    pub subject: String,
    /// MarkdownV2-escaped note, already truncated. `None` when the user skipped it.
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReminderEntry {
    pub fn key(&self) -> ReminderKey {
        ReminderKey::new(self.owner, self.subject.clone())
    }
}

/// Payload handed to a notification sink on every firing.
///
/// Carries only what a transport needs to render the reminder; the note body
/// itself is fetched on demand ("show more").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub owner: OwnerId,
    pub subject: String,
    /// True when the entry has a note, so the transport can offer a "show more" action.
    pub has_note: bool,
    /// True on the last firing of the chain; the entry is removed right after.
    pub terminal: bool,
    /// Step whose delay just elapsed (1..=6).
    pub step: u8,
}
