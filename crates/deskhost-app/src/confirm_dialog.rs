//! Confirm dialog state.
//!
//! Data model for the yes/no prompts the host window presents. The answer
//! comes back as one of the option messages.

use crate::message::Message;

pub const CLOSE_PROMPT: &str = "Are you sure you want to exit the application?";

#[derive(Debug, Clone)]
pub struct ConfirmDialogState {
    pub title: String,
    pub message: String,
    pub options: Vec<(String, Message)>,
}

impl ConfirmDialogState {
    /// Create a generic confirmation dialog
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        options: Vec<(&str, Message)>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            options: options
                .into_iter()
                .map(|(label, msg)| (label.to_string(), msg))
                .collect(),
        }
    }

    /// Window close confirmation: "Yes" closes, "No" keeps the window open
    pub fn close_confirmation() -> Self {
        Self::new(
            "Confirm",
            CLOSE_PROMPT,
            vec![("Yes", Message::ConfirmClose), ("No", Message::CancelClose)],
        )
    }

    /// Message for the option matching `answer`: the full label or its
    /// first letter, ignoring case
    pub fn answer(&self, answer: &str) -> Option<Message> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        self.options
            .iter()
            .find(|(label, _)| {
                label.eq_ignore_ascii_case(answer)
                    || (answer.len() == 1
                        && label.get(..1).is_some_and(|c| c.eq_ignore_ascii_case(answer)))
            })
            .map(|(_, msg)| msg.clone())
    }
}
