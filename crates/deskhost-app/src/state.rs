//! Application state (Model in TEA pattern)

use deskhost_core::{RuntimeMode, ShutdownOutcome};

use crate::config::Settings;
use crate::confirm_dialog::ConfirmDialogState;

/// Lifecycle phase of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Starting,
    Running,
    /// Waiting on the backend stop before quitting
    ShuttingDown,
    Quitting,
}

/// Progress of the one backend stop per shell lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownState {
    #[default]
    Idle,
    InFlight,
    Done(ShutdownOutcome),
}

/// What the shell knows about the backend
#[derive(Debug, Clone, Default)]
pub struct BackendStatus {
    pub pid: Option<u32>,
    pub running: bool,
    pub ready: bool,
    /// Exit code of the last backend process, if it exited
    pub last_exit_code: Option<i32>,
}

/// Complete application state (the Model in TEA)
#[derive(Debug)]
pub struct AppState {
    pub mode: RuntimeMode,
    pub phase: AppPhase,
    pub settings: Settings,

    pub backend: BackendStatus,
    pub shutdown: ShutdownState,
    /// Quit once the in-flight stop completes
    pub quit_after_shutdown: bool,

    pub window_open: bool,
    pub confirm_dialog_state: Option<ConfirmDialogState>,
    /// Location the window should show once the UI loads
    pub ui_location: String,
    /// Location currently loaded (or loading) in the window
    pub current_location: Option<String>,
}

impl AppState {
    pub fn new(mode: RuntimeMode, settings: Settings) -> Self {
        Self {
            mode,
            phase: AppPhase::default(),
            settings,
            backend: BackendStatus::default(),
            shutdown: ShutdownState::default(),
            quit_after_shutdown: false,
            window_open: true,
            confirm_dialog_state: None,
            ui_location: crate::ui_source::BLANK_PAGE.to_string(),
            current_location: None,
        }
    }

    pub fn with_ui_location(mut self, location: impl Into<String>) -> Self {
        self.ui_location = location.into();
        self
    }

    /// A backend is tracked and its stop hasn't completed
    pub fn backend_needs_stop(&self) -> bool {
        self.backend.running && !matches!(self.shutdown, ShutdownState::Done(_))
    }

    /// Begin the stop if none has started. Returns whether this call started it.
    pub fn begin_shutdown(&mut self) -> bool {
        if self.shutdown == ShutdownState::Idle && self.backend.running {
            self.shutdown = ShutdownState::InFlight;
            true
        } else {
            false
        }
    }

    pub fn is_prompting(&self) -> bool {
        self.confirm_dialog_state.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(RuntimeMode::Development, Settings::default())
    }

    #[test]
    fn test_new_state_defaults() {
        let state = state();
        assert_eq!(state.phase, AppPhase::Starting);
        assert_eq!(state.shutdown, ShutdownState::Idle);
        assert!(state.window_open);
        assert!(!state.should_quit());
        assert!(!state.backend_needs_stop());
    }

    #[test]
    fn test_begin_shutdown_only_once() {
        let mut state = state();
        state.backend.running = true;

        assert!(state.begin_shutdown());
        assert!(!state.begin_shutdown());
        assert_eq!(state.shutdown, ShutdownState::InFlight);
    }

    #[test]
    fn test_begin_shutdown_without_backend() {
        let mut state = state();
        assert!(!state.begin_shutdown());
        assert_eq!(state.shutdown, ShutdownState::Idle);
    }

    #[test]
    fn test_done_shutdown_releases_quit() {
        let mut state = state();
        state.backend.running = true;
        state.shutdown = ShutdownState::Done(ShutdownOutcome::ForcedAttempted);
        assert!(!state.backend_needs_stop());
    }
}
