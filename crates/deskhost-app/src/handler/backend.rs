//! Backend launch results and process events

use deskhost_core::prelude::*;
use deskhost_core::BackendEvent;

use crate::state::{AppPhase, AppState};

use super::{UpdateAction, UpdateResult};

/// Title of the blocking dialog shown when the packaged backend can't start
pub const START_FAILED_TITLE: &str = "Backend start failed";

pub fn handle_started(state: &mut AppState, pid: Option<u32>, command: String) -> UpdateResult {
    info!("Backend running: {} (pid {:?})", command, pid);
    state.backend.pid = pid;
    state.backend.running = true;
    state.backend.ready = false;
    if state.phase == AppPhase::Starting {
        state.phase = AppPhase::Running;
    }
    UpdateResult::action(UpdateAction::ProbeReadiness)
}

pub fn handle_start_failed(state: &mut AppState, reason: String, user_visible: bool) -> UpdateResult {
    error!("Backend failed to start: {}", reason);
    if state.phase == AppPhase::Starting {
        state.phase = AppPhase::Running;
    }

    if user_visible {
        UpdateResult::action(UpdateAction::ShowError {
            title: START_FAILED_TITLE.to_string(),
            message: reason,
        })
    } else {
        UpdateResult::none()
    }
}

pub fn handle_event(state: &mut AppState, event: BackendEvent) -> UpdateResult {
    let development = state.mode.is_development();

    match event {
        BackendEvent::Stdout(line) => {
            if development {
                info!("backend: {}", line);
            } else {
                debug!("backend: {}", line);
            }
        }
        BackendEvent::Stderr(line) => {
            if development {
                warn!("backend: {}", line);
            } else {
                debug!("backend: {}", line);
            }
        }
        BackendEvent::Exited { code, signal } => {
            info!("Backend exited (code={:?}, signal={:?})", code, signal);
            state.backend.running = false;
            state.backend.ready = false;
            state.backend.pid = None;
            state.backend.last_exit_code = code;
        }
        BackendEvent::Failed { reason } => {
            error!("Backend process error: {}", reason);
            state.backend.running = false;
            state.backend.ready = false;
            state.backend.pid = None;
        }
    }

    UpdateResult::none()
}
