//! Main update function - handles state transitions (TEA pattern)

use deskhost_core::prelude::*;

use crate::message::Message;
use crate::state::AppState;
use crate::ui_source::load_failure_page;

use super::{backend, lifecycle, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Startup => UpdateResult::action_then(UpdateAction::LaunchBackend, Message::LoadUi),

        Message::BackendStarted { pid, command } => {
            backend::handle_started(state, pid, command)
        }
        Message::BackendStartFailed {
            reason,
            user_visible,
        } => backend::handle_start_failed(state, reason, user_visible),
        Message::Backend(event) => backend::handle_event(state, event),
        Message::BackendReady => {
            state.backend.ready = state.backend.running;
            UpdateResult::none()
        }

        Message::CloseRequested => lifecycle::handle_close_requested(state),
        Message::Interrupt => lifecycle::handle_interrupt(state),
        Message::ConfirmClose => lifecycle::handle_confirm_close(state),
        Message::CancelClose => lifecycle::handle_cancel_close(state),
        Message::AllWindowsClosed => lifecycle::handle_all_windows_closed(state),
        Message::BeforeQuit => lifecycle::handle_before_quit(state),
        Message::ShutdownComplete(outcome) => lifecycle::handle_shutdown_complete(state, outcome),

        Message::LoadUi => {
            if !state.window_open {
                return UpdateResult::none();
            }
            let location = state.ui_location.clone();
            state.current_location = Some(location.clone());
            UpdateResult::action(UpdateAction::LoadLocation(location))
        }

        Message::UiLoaded { url } => {
            if state.mode.is_development() {
                info!("Renderer loaded {}", url);
            } else {
                debug!("Renderer loaded {}", url);
            }
            UpdateResult::none()
        }

        Message::UiLoadFailed {
            url,
            code,
            description,
        } => {
            error!("UI failed to load: {} ({}) at {}", code, description, url);
            if !state.window_open {
                return UpdateResult::none();
            }
            let page = load_failure_page(&url, code, &description);
            state.current_location = Some(page.clone());
            UpdateResult::action(UpdateAction::LoadLocation(page))
        }
    }
}
