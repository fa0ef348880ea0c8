//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signal handling error: {message}")]
    Signal { message: String },

    // ─────────────────────────────────────────────────────────────
    // Backend Launch Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to spawn backend process `{command}`: {reason}")]
    ProcessSpawn { command: String, reason: String },

    #[error("Could not start backend in development mode; tried interpreters: {}", tried.join(", "))]
    NoInterpreter { tried: Vec<String> },

    #[error("Backend executable not found: {path}")]
    ExecutableNotFound { path: PathBuf },

    #[error("A backend process is already running (pid {pid:?})")]
    AlreadyRunning { pid: Option<u32> },

    #[error("Backend process error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Backend Shutdown Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Backend HTTP request failed: {message}")]
    Http { message: String },

    #[error("Failed to force-terminate process {pid}: {reason}")]
    Kill { pid: u32, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal {
            message: message.into(),
        }
    }

    pub fn process_spawn(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessSpawn {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn kill(pid: u32, reason: impl Into<String>) -> Self {
        Self::Kill {
            pid,
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error should be surfaced to the user with a blocking dialog
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Error::ProcessSpawn { .. } | Error::ExecutableNotFound { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
