//! `recall-core` — configuration, shared identifiers and note text helpers
//! used by every other `recall-*` crate.

pub mod config;
pub mod error;
pub mod reminder;
pub mod text;
pub mod types;

pub use error::{ConfigError, Result};
pub use reminder::{Notification, ReminderEntry};
pub use types::{OwnerId, ReminderKey};
