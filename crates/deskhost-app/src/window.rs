//! The host window the engine drives.
//!
//! Implemented by the binary's frontend; mocked in tests.

use crate::confirm_dialog::ConfirmDialogState;

#[cfg_attr(test, mockall::automock)]
pub trait HostWindow: Send {
    /// Present a yes/no prompt. The answer is posted back as the matching
    /// option's message.
    fn show_confirmation(&self, dialog: &ConfirmDialogState);

    /// Present a blocking error
    fn show_error(&self, title: &str, message: &str);

    /// Navigate the main frame
    fn load(&self, location: &str);

    fn close(&self);
}
