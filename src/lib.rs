//! deskhost Library
//!
//! Desktop shell host: runs the window frontend and supervises the local
//! backend process behind it.

pub mod api;
pub mod console;

// Re-export main entry points
pub use console::runner::run_console;
