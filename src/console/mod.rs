//! Console frontend - the shell's window rendered as NDJSON on stdout
//!
//! Every window operation is written to stdout as one JSON event per line,
//! and commands are read from stdin. Logs go to stderr and the log file, so
//! stdout stays machine-readable.
//!
//! # Example Output
//!
//! ```json
//! {"event":"load","location":"http://localhost:5173/","timestamp":1704700001000}
//! {"event":"confirm","title":"Confirm","message":"Are you sure you want to exit the application?","options":["Yes","No"],"timestamp":1704700002000}
//! {"event":"close","timestamp":1704700003000}
//! ```

pub mod runner;

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use deskhost_app::{ConfirmDialogState, HostWindow, Message};

/// Events emitted on stdout
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A yes/no prompt is waiting for an answer on stdin
    Confirm {
        title: String,
        message: String,
        options: Vec<String>,
        timestamp: i64,
    },

    /// A blocking error
    Error {
        title: String,
        message: String,
        timestamp: i64,
    },

    /// The main frame navigated
    Load { location: String, timestamp: i64 },

    /// The main window closed
    Close { timestamp: i64 },
}

impl HostEvent {
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn confirm(dialog: &ConfirmDialogState) -> Self {
        HostEvent::Confirm {
            title: dialog.title.clone(),
            message: dialog.message.clone(),
            options: dialog.options.iter().map(|(label, _)| label.clone()).collect(),
            timestamp: Self::now(),
        }
    }

    pub fn error(title: &str, message: &str) -> Self {
        HostEvent::Error {
            title: title.to_string(),
            message: message.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn load(location: &str) -> Self {
        HostEvent::Load {
            location: location.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn close() -> Self {
        HostEvent::Close {
            timestamp: Self::now(),
        }
    }

    /// Write this event as one JSON line on stdout
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{}", json);
                let _ = stdout.flush();
            }
            Err(e) => error!("Failed to serialize host event: {}", e),
        }
    }
}

/// The prompt currently waiting for an answer, shared with the stdin reader
#[derive(Debug, Clone, Default)]
pub struct PendingPrompt(Arc<Mutex<Option<ConfirmDialogState>>>);

impl PendingPrompt {
    pub fn set(&self, dialog: ConfirmDialogState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(dialog);
    }

    /// Resolve the pending prompt with `answer`.
    ///
    /// Returns `None` when no prompt is pending or the answer matches no
    /// option; the prompt stays pending in the latter case.
    pub fn answer(&self, answer: &str) -> Option<Message> {
        let mut pending = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let msg = pending.as_ref()?.answer(answer)?;
        *pending = None;
        Some(msg)
    }

    pub fn is_pending(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// [`HostWindow`] that reports to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleWindow {
    prompt: PendingPrompt,
}

impl ConsoleWindow {
    pub fn new(prompt: PendingPrompt) -> Self {
        Self { prompt }
    }
}

impl HostWindow for ConsoleWindow {
    fn show_confirmation(&self, dialog: &ConfirmDialogState) {
        self.prompt.set(dialog.clone());
        HostEvent::confirm(dialog).emit();
    }

    fn show_error(&self, title: &str, message: &str) {
        HostEvent::error(title, message).emit();
    }

    fn load(&self, location: &str) {
        HostEvent::load(location).emit();
    }

    fn close(&self) {
        HostEvent::close().emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_event_serialization() {
        let event = HostEvent::confirm(&ConfirmDialogState::close_confirmation());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "confirm");
        assert_eq!(json["title"], "Confirm");
        assert_eq!(json["options"], serde_json::json!(["Yes", "No"]));
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_close_event_serialization() {
        let json = serde_json::to_string(&HostEvent::close()).unwrap();
        assert!(json.starts_with(r#"{"event":"close""#));
    }

    #[test]
    fn test_prompt_answer_clears_pending() {
        let prompt = PendingPrompt::default();
        assert!(prompt.answer("y").is_none());

        prompt.set(ConfirmDialogState::close_confirmation());
        assert!(prompt.answer("maybe").is_none());
        assert!(prompt.is_pending());

        assert!(matches!(prompt.answer("n"), Some(Message::CancelClose)));
        assert!(!prompt.is_pending());
    }

    #[test]
    fn test_window_records_prompt() {
        let prompt = PendingPrompt::default();
        let window = ConsoleWindow::new(prompt.clone());

        window.show_confirmation(&ConfirmDialogState::close_confirmation());

        assert!(matches!(prompt.answer("Yes"), Some(Message::ConfirmClose)));
    }
}
