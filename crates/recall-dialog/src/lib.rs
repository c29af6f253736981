//! `recall-dialog` — transport-agnostic registration and removal dialogs.
//!
//! A front-end (console, chat adapter) maps user input onto
//! [`ConversationController`] calls and renders the returned [`Reply`].

pub mod controller;
pub mod error;
pub mod types;

pub use controller::ConversationController;
pub use error::{DialogError, Result};
pub use types::{DialogKind, Reply};
