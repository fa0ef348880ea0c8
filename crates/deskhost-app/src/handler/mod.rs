//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `lifecycle`: Window close, quit, and backend stop coordination
//! - `backend`: Backend launch results and process events

pub(crate) mod backend;
pub(crate) mod lifecycle;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use crate::confirm_dialog::ConfirmDialogState;
use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Resolve and spawn the backend
    LaunchBackend,

    /// Run the single-flight backend stop; posts `ShutdownComplete`
    StopBackend,

    /// Poll the backend until it answers; posts `BackendReady`
    ProbeReadiness,

    /// Present a yes/no prompt; the answer arrives as a message
    ShowConfirmDialog(ConfirmDialogState),

    /// Present a blocking error
    ShowError { title: String, message: String },

    /// Point the window at `location`
    LoadLocation(String),

    /// Close the main window
    CloseWindow,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn action_then(action: UpdateAction, msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }
}
