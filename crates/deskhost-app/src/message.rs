//! Message types for the TEA pattern

use deskhost_core::{BackendEvent, ShutdownOutcome};

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Shell is up: launch the backend and load the UI
    Startup,

    // ─────────────────────────────────────────────────────────
    // Backend Lifecycle
    // ─────────────────────────────────────────────────────────
    /// The backend spawned
    BackendStarted {
        pid: Option<u32>,
        command: String,
    },

    /// The backend could not be started
    BackendStartFailed {
        reason: String,
        /// Show a blocking error to the user
        user_visible: bool,
    },

    /// Output or exit from the backend process
    Backend(BackendEvent),

    /// The backend answered its first request
    BackendReady,

    /// A stop attempt finished
    ShutdownComplete(ShutdownOutcome),

    // ─────────────────────────────────────────────────────────
    // Window / Application Events
    // ─────────────────────────────────────────────────────────
    /// User asked to close the main window
    CloseRequested,

    /// Interrupt from the terminal (SIGINT, Ctrl+C)
    Interrupt,

    /// User confirmed the close prompt
    ConfirmClose,

    /// User declined the close prompt
    CancelClose,

    /// The last window is gone
    AllWindowsClosed,

    /// The application is about to quit (OS quit, programmatic quit)
    BeforeQuit,

    // ─────────────────────────────────────────────────────────
    // UI Loading
    // ─────────────────────────────────────────────────────────
    /// Point the window at the resolved UI source
    LoadUi,

    /// The main frame finished loading
    UiLoaded { url: String },

    /// The main frame failed to load
    UiLoadFailed {
        url: String,
        code: i32,
        description: String,
    },
}
