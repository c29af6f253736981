use serde::{Deserialize, Serialize};

use recall_core::OwnerId;

/// Which multi-turn dialog a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Register a new subject (subject → note → save).
    Memorize,
    /// Pick a subject to stop memorizing.
    Forget,
}

/// Identity of one dialog session.
pub type SessionKey = (OwnerId, DialogKind);

/// Where a session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// Waiting for the subject text.
    AwaitingSubject,
    /// Subject captured; waiting for a note or `/skip`.
    AwaitingNote { subject: String },
    /// Waiting for `/save` or `/cancel`. `note` is already escaped and truncated.
    AwaitingSave {
        subject: String,
        note: Option<String>,
    },
    /// Waiting for the subject to delete.
    AwaitingRemoval,
}

/// One turn of output for the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    /// Suggested one-time keyboard, row by row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Vec<Vec<String>>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, rows: Vec<Vec<String>>) -> Self {
        self.keyboard = Some(rows);
        self
    }
}

/// Lay `items` out two per row, the last row holding the odd one out.
pub fn two_column(items: &[String]) -> Vec<Vec<String>> {
    items.chunks(2).map(<[String]>::to_vec).collect()
}
