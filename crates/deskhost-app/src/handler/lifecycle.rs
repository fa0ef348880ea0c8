//! Window close, quit, and backend stop coordination
//!
//! The backend is stopped at most once per shell lifetime. Quit is deferred
//! while that stop is in flight and re-issued when it completes; after that
//! every quit proceeds.

use deskhost_core::prelude::*;
use deskhost_core::ShutdownOutcome;

use crate::confirm_dialog::ConfirmDialogState;
use crate::message::Message;
use crate::state::{AppPhase, AppState, ShutdownState};

use super::{UpdateAction, UpdateResult};

pub fn handle_close_requested(state: &mut AppState) -> UpdateResult {
    if !state.window_open || state.is_prompting() {
        return UpdateResult::none();
    }

    if state.settings.window.confirm_close {
        let dialog = ConfirmDialogState::close_confirmation();
        state.confirm_dialog_state = Some(dialog.clone());
        UpdateResult::action(UpdateAction::ShowConfirmDialog(dialog))
    } else {
        UpdateResult::message(Message::ConfirmClose)
    }
}

/// First interrupt asks like a close; another while the prompt is up quits
pub fn handle_interrupt(state: &mut AppState) -> UpdateResult {
    if state.is_prompting() {
        warn!("Interrupted again while awaiting close confirmation, quitting");
        return UpdateResult::message(Message::BeforeQuit);
    }
    handle_close_requested(state)
}

pub fn handle_cancel_close(state: &mut AppState) -> UpdateResult {
    debug!("Close cancelled");
    state.confirm_dialog_state = None;
    UpdateResult::none()
}

pub fn handle_confirm_close(state: &mut AppState) -> UpdateResult {
    state.confirm_dialog_state = None;
    if !state.window_open {
        return UpdateResult::none();
    }

    info!("Closing main window");
    state.window_open = false;
    UpdateResult::action_then(UpdateAction::CloseWindow, Message::AllWindowsClosed)
}

pub fn handle_all_windows_closed(state: &mut AppState) -> UpdateResult {
    defer_quit_for_shutdown(state)
}

pub fn handle_before_quit(state: &mut AppState) -> UpdateResult {
    state.confirm_dialog_state = None;
    defer_quit_for_shutdown(state)
}

pub fn handle_shutdown_complete(state: &mut AppState, outcome: ShutdownOutcome) -> UpdateResult {
    info!("Backend stop finished: {}", outcome);
    state.shutdown = ShutdownState::Done(outcome);

    if state.quit_after_shutdown {
        state.quit_after_shutdown = false;
        UpdateResult::message(Message::BeforeQuit)
    } else {
        UpdateResult::none()
    }
}

/// Quit now, or start/join the backend stop and quit when it completes
fn defer_quit_for_shutdown(state: &mut AppState) -> UpdateResult {
    if !state.backend_needs_stop() {
        info!("Quitting");
        state.phase = AppPhase::Quitting;
        return UpdateResult::none();
    }

    state.phase = AppPhase::ShuttingDown;
    state.quit_after_shutdown = true;

    if state.begin_shutdown() {
        info!("Quit deferred until the backend stops");
        UpdateResult::action(UpdateAction::StopBackend)
    } else {
        debug!("Quit deferred, backend stop already in flight");
        UpdateResult::none()
    }
}
