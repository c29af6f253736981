use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use recall_core::text::{prepare_note, unescape_markdown_v2};
use recall_core::OwnerId;
use recall_scheduler::ReminderScheduler;
use recall_store::{ReminderStore, StoreError};

use crate::error::Result;
use crate::types::{two_column, DialogKind, DialogState, Reply, SessionKey};

pub const HELP_TEXT: &str = "I will help you to remember things using spaced repetition.\n\
Use:\n\
  /start_memorizing to start remembering something\n\
  /stop_memorizing to stop remembering something\n\
  /show_my_list to show everything you are remembering";

/// Orchestrates registration and removal dialogs.
///
/// State lives in one [`DialogState`] per `(owner, DialogKind)` session.
/// Beginning a dialog ends any other dialog the owner had open, so a text
/// turn is never ambiguous.
pub struct ConversationController {
    store: Arc<dyn ReminderStore>,
    scheduler: ReminderScheduler,
    sessions: DashMap<SessionKey, DialogState>,
}

impl ConversationController {
    pub fn new(store: Arc<dyn ReminderStore>, scheduler: ReminderScheduler) -> Self {
        Self {
            store,
            scheduler,
            sessions: DashMap::new(),
        }
    }

    pub fn help(&self) -> Reply {
        Reply::text(HELP_TEXT)
    }

    /// Current state of `owner`'s `kind` session, if one is open.
    pub fn state(&self, owner: OwnerId, kind: DialogKind) -> Option<DialogState> {
        self.sessions.get(&(owner, kind)).map(|s| s.value().clone())
    }

    pub fn begin_memorizing(&self, owner: OwnerId) -> Reply {
        self.open(owner, DialogKind::Memorize, DialogState::AwaitingSubject);
        Reply::text("Please, type in subject")
    }

    pub fn begin_forgetting(&self, owner: OwnerId) -> Result<Reply> {
        self.end_all(owner);
        let subjects = self.store.list_subjects(owner)?;
        if subjects.is_empty() {
            return Ok(Reply::text(
                "You have no entries in remembering process.\nUse /start_memorizing to add one.",
            ));
        }
        self.open(owner, DialogKind::Forget, DialogState::AwaitingRemoval);
        Ok(Reply::text("Choose subject to delete").with_keyboard(two_column(&subjects)))
    }

    /// Feed free text into whichever dialog `owner` has open.
    ///
    /// Returns `None` when no dialog is waiting for text.
    pub async fn handle_text(&self, owner: OwnerId, text: &str) -> Result<Option<Reply>> {
        if let Some(state) = self.state(owner, DialogKind::Memorize) {
            return Ok(self.memorize_turn(owner, state, text));
        }
        if self.state(owner, DialogKind::Forget).is_some() {
            return self.forget_turn(owner, text).await.map(Some);
        }
        Ok(None)
    }

    /// Register the subject without a note.
    pub fn skip(&self, owner: OwnerId) -> Option<Reply> {
        let key = (owner, DialogKind::Memorize);
        let mut state = self.sessions.get_mut(&key)?;
        let DialogState::AwaitingNote { subject } = state.value() else {
            return None;
        };
        let subject = subject.clone();
        let reply = save_prompt(&subject, None);
        *state = DialogState::AwaitingSave {
            subject,
            note: None,
        };
        Some(reply)
    }

    /// Persist the pending entry and start its reminder chain.
    pub async fn save(&self, owner: OwnerId) -> Result<Option<Reply>> {
        let key = (owner, DialogKind::Memorize);
        let (subject, note) = match self.sessions.remove(&key) {
            Some((_, DialogState::AwaitingSave { subject, note })) => (subject, note),
            Some((key, other)) => {
                // not ready to save yet; keep the dialog where it was
                self.sessions.insert(key, other);
                return Ok(None);
            }
            None => return Ok(None),
        };

        match self.store.store(&subject, owner, note.as_deref()) {
            Ok(()) => {}
            Err(StoreError::DuplicateEntry { .. }) => {
                debug!(%owner, subject = %subject, "duplicate registration rejected");
                return Ok(Some(Reply::text(format!(
                    "You are already memorizing {subject}. Stop it first to start over."
                ))));
            }
            Err(e) => return Err(e.into()),
        }
        self.scheduler.schedule(&subject, owner).await;
        info!(%owner, subject = %subject, "subject registered");
        Ok(Some(Reply::text("Reminder is set")))
    }

    /// Abort every dialog `owner` has open.
    pub fn cancel(&self, owner: OwnerId) -> Reply {
        self.end_all(owner);
        Reply::text("Process canceled")
    }

    /// All of `owner`'s subjects in registration order.
    pub fn show_list(&self, owner: OwnerId) -> Result<Reply> {
        let subjects = self.store.list_subjects(owner)?;
        if subjects.is_empty() {
            return Ok(Reply::text("You have no entries added"));
        }
        let lines: Vec<String> = subjects.iter().map(|s| format!("- {s}")).collect();
        Ok(Reply::text(format!("All your entries:\n{}", lines.join("\n"))))
    }

    /// The note behind a reminder's "show more" action, unescaped.
    pub fn show_more(&self, owner: OwnerId, subject: &str) -> Result<Reply> {
        match self.store.fetch(subject, owner) {
            Ok(note) => Ok(Reply::text(
                note.map(|n| unescape_markdown_v2(&n)).unwrap_or_default(),
            )),
            Err(e) if e.is_not_found() => Ok(Reply::text("Entry was deleted")),
            Err(e) => Err(e.into()),
        }
    }

    // --- private helpers ---------------------------------------------------

    fn open(&self, owner: OwnerId, kind: DialogKind, state: DialogState) {
        self.end_all(owner);
        self.sessions.insert((owner, kind), state);
    }

    fn end_all(&self, owner: OwnerId) {
        self.sessions.remove(&(owner, DialogKind::Memorize));
        self.sessions.remove(&(owner, DialogKind::Forget));
    }

    fn memorize_turn(&self, owner: OwnerId, state: DialogState, text: &str) -> Option<Reply> {
        let key = (owner, DialogKind::Memorize);
        match state {
            DialogState::AwaitingSubject => {
                self.sessions.insert(
                    key,
                    DialogState::AwaitingNote {
                        subject: text.to_string(),
                    },
                );
                Some(
                    Reply::text("Please, type in short description or\nskip it")
                        .with_keyboard(vec![vec!["/skip".to_string()]]),
                )
            }
            DialogState::AwaitingNote { subject } => {
                let note = prepare_note(text);
                let reply = save_prompt(&subject, Some(&note));
                self.sessions.insert(
                    key,
                    DialogState::AwaitingSave {
                        subject,
                        note: Some(note),
                    },
                );
                Some(reply)
            }
            DialogState::AwaitingSave { subject, note } => {
                Some(save_prompt(&subject, note.as_deref()))
            }
            // removal state belongs to the forget dialog
            DialogState::AwaitingRemoval => None,
        }
    }

    async fn forget_turn(&self, owner: OwnerId, subject: &str) -> Result<Reply> {
        self.sessions.remove(&(owner, DialogKind::Forget));
        match self.store.fetch(subject, owner) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                return Ok(Reply::text(format!("There is no entry named {subject}")));
            }
            Err(e) => return Err(e.into()),
        }
        self.scheduler.cancel(subject, owner).await;
        self.store.remove(subject, owner)?;
        info!(%owner, subject, "subject removed");
        Ok(Reply::text("Entry deleted successfully!"))
    }
}

fn save_prompt(subject: &str, note: Option<&str>) -> Reply {
    let text = match note {
        Some(note) => format!("{subject}\n{}\nSave?", unescape_markdown_v2(note)),
        None => format!("{subject}\nSave?"),
    };
    Reply::text(text).with_keyboard(vec![vec!["/save".to_string()], vec!["/cancel".to_string()]])
}
