//! Console delivery — prints fired reminders and dialog replies to stdout.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use recall_core::config::OutputFormat;
use recall_core::Notification;
use recall_dialog::Reply;
use recall_scheduler::{DeliveryError, NotificationSink};

/// [`NotificationSink`] that writes one record per firing to `out`.
pub struct ConsoleSink<W> {
    out: Mutex<W>,
    format: OutputFormat,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

#[async_trait]
impl<W: Write + Send> NotificationSink for ConsoleSink<W> {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let line = match self.format {
            OutputFormat::Text => render_notification(notification),
            OutputFormat::Json => serde_json::json!({
                "event":    "reminder.fire",
                "owner":    notification.owner,
                "subject":  notification.subject,
                "has_note": notification.has_note,
                "terminal": notification.terminal,
                "step":     notification.step,
            })
            .to_string(),
        };
        let mut out = self.out.lock().unwrap();
        writeln!(out, "{line}")
            .and_then(|_| out.flush())
            .map_err(|e| DeliveryError::Channel(e.to_string()))
    }
}

/// Human-readable form of a firing.
pub fn render_notification(n: &Notification) -> String {
    let subject = &n.subject;
    if n.terminal {
        return format!(
            "[reminder] {subject}\nI hope you remembered it :)\nI won't remind you about it anymore."
        );
    }
    if n.has_note {
        format!("[reminder] {subject}  (show more: /more {subject})")
    } else {
        format!("[reminder] {subject}")
    }
}

/// Plain-text form of a dialog reply, keyboard rows shown as `[a] [b]`.
pub fn render_reply(reply: &Reply, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::json!({ "event": "reply", "reply": reply }).to_string();
    }
    let mut out = reply.text.clone();
    for row in reply.keyboard.iter().flatten() {
        let buttons: Vec<String> = row.iter().map(|b| format!("[{b}]")).collect();
        out.push('\n');
        out.push_str(&buttons.join(" "));
    }
    out
}
