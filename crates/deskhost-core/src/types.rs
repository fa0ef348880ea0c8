//! Domain types shared by every deskhost crate

use std::fmt;

/// Environment variable consulted by [`RuntimeMode::detect`] when no CLI flag is given
pub const MODE_ENV: &str = "DESKHOST_MODE";

/// How the shell is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Running from a source checkout; the backend is a script under an interpreter
    Development,
    /// Running from a packaged build; the backend is a bundled executable
    Packaged,
}

impl RuntimeMode {
    /// Parse a mode name. Accepts a few common aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(RuntimeMode::Development),
            "packaged" | "production" | "prod" => Some(RuntimeMode::Packaged),
            _ => None,
        }
    }

    /// Resolve the runtime mode.
    ///
    /// Priority: explicit flag, then [`MODE_ENV`], then the build profile
    /// (debug builds run in development mode).
    pub fn detect(flag: Option<RuntimeMode>) -> Self {
        if let Some(mode) = flag {
            return mode;
        }

        if let Some(mode) = std::env::var(MODE_ENV)
            .ok()
            .as_deref()
            .and_then(RuntimeMode::parse)
        {
            return mode;
        }

        if cfg!(debug_assertions) {
            RuntimeMode::Development
        } else {
            RuntimeMode::Packaged
        }
    }

    pub fn is_development(&self) -> bool {
        *self == RuntimeMode::Development
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => write!(f, "development"),
            RuntimeMode::Packaged => write!(f, "packaged"),
        }
    }
}

/// Operating system family the backend runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    /// Any identifier we do not recognise
    Other(String),
}

impl Platform {
    /// Map an OS identifier to a platform.
    ///
    /// Accepts both Rust (`std::env::consts::OS`) and Node-style
    /// (`win32`, `darwin`) identifiers.
    pub fn from_os_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Platform::Windows,
            "macos" | "darwin" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    /// The platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_os_id(std::env::consts::OS)
    }

    pub fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
            Platform::Other(id) => write!(f, "{}", id),
        }
    }
}

/// Outcome of a single stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The backend exited within the timeout
    Graceful,
    /// The timeout elapsed and a forced-termination command was issued.
    /// Actual death is observed later through the exit event.
    ForcedAttempted,
    /// No backend was running; nothing was done
    AlreadyStopped,
    /// The backend did not exit and no process id was known to kill
    FailedToStop,
}

impl ShutdownOutcome {
    /// Whether a kill command was issued as part of this stop
    pub fn was_forced(&self) -> bool {
        *self == ShutdownOutcome::ForcedAttempted
    }
}

impl fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShutdownOutcome::Graceful => "graceful",
            ShutdownOutcome::ForcedAttempted => "forced-attempted",
            ShutdownOutcome::AlreadyStopped => "already-stopped",
            ShutdownOutcome::FailedToStop => "failed-to-stop",
        };
        write!(f, "{}", label)
    }
}
