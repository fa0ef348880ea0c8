//! deskhost-app - Application state and lifecycle orchestration
//!
//! Implements the TEA (The Elm Architecture) pattern that binds the backend
//! process to the window lifecycle: launch at startup, confirm on close, and
//! stop the backend exactly once before quitting. Also holds configuration
//! loading and UI source resolution.

pub mod actions;
pub mod config;
pub mod confirm_dialog;
pub mod engine;
pub mod handler;
pub mod message;
pub mod signals;
pub mod state;
pub mod ui_load;
pub mod ui_source;
pub mod window;

// Re-export primary types
pub use actions::BackendContext;
pub use confirm_dialog::ConfirmDialogState;
pub use engine::Engine;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use state::{AppPhase, AppState, ShutdownState};
pub use ui_source::{load_failure_page, resolve_ui_source, UiSource};
pub use window::HostWindow;
