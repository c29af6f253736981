use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use recall_core::ReminderKey;

/// Payload carried by a sleeping timer task into the firing handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub key: ReminderKey,
    /// Step whose delay the timer waited on.
    pub step: u8,
    /// Identity of the timer instance; stale firings are dropped.
    pub generation: u64,
}

/// Read-only view of a live timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerInfo {
    pub step: u8,
    pub fire_at: DateTime<Utc>,
}

/// The single live timer of a key.
#[derive(Debug)]
pub(crate) struct ScheduledTimer {
    pub step: u8,
    pub fire_at: DateTime<Utc>,
    pub generation: u64,
    pub handle: CancellationToken,
}

impl ScheduledTimer {
    pub fn info(&self) -> TimerInfo {
        TimerInfo {
            step: self.step,
            fire_at: self.fire_at,
        }
    }
}

/// Per-key state guarded by the key's mutex.
///
/// `retired` is set when the slot is unlinked from the table; a task that
/// wins the lock on a retired slot must look the key up again.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub timer: Option<ScheduledTimer>,
    pub retired: bool,
}
