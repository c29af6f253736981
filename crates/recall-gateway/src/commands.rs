//! Console input: one line per turn, slash commands or free text.

use recall_core::OwnerId;
use recall_dialog::{ConversationController, Reply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    StartMemorizing,
    StopMemorizing,
    ShowMyList,
    Skip,
    Save,
    Cancel,
    /// `/more <subject>` — reveal a reminder's note.
    More(String),
    Unknown(String),
    Text(String),
}

/// Parse a raw input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Text(line.to_string()));
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let cmd = match name {
        "start" | "help" => Command::Start,
        "start_memorizing" => Command::StartMemorizing,
        "stop_memorizing" => Command::StopMemorizing,
        "show_my_list" => Command::ShowMyList,
        "skip" => Command::Skip,
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "more" if !arg.is_empty() => Command::More(arg.to_string()),
        other => Command::Unknown(other.to_string()),
    };
    Some(cmd)
}

/// Run one command against the controller.
///
/// Returns `None` when the command does not apply in the current dialog state.
pub async fn dispatch(
    controller: &ConversationController,
    owner: OwnerId,
    command: Command,
) -> recall_dialog::Result<Option<Reply>> {
    let reply = match command {
        Command::Start => Some(controller.help()),
        Command::StartMemorizing => Some(controller.begin_memorizing(owner)),
        Command::StopMemorizing => Some(controller.begin_forgetting(owner)?),
        Command::ShowMyList => Some(controller.show_list(owner)?),
        Command::Skip => controller.skip(owner),
        Command::Save => controller.save(owner).await?,
        Command::Cancel => Some(controller.cancel(owner)),
        Command::More(subject) => Some(controller.show_more(owner, &subject)?),
        Command::Unknown(name) => Some(Reply::text(format!(
            "Unknown command /{name}. Use /start to see what I can do."
        ))),
        Command::Text(text) => controller.handle_text(owner, &text).await?,
    };
    Ok(reply)
}
