//! Executable resolution
//!
//! Decides how the backend is invoked for a runtime mode and platform. Pure:
//! no filesystem access, no environment lookups.

use std::fmt;
use std::path::{Path, PathBuf};

use deskhost_core::{Platform, RuntimeMode};

/// Interpreter names tried, in order, for the development script
pub const DEFAULT_INTERPRETERS: &[&str] = &["python", "python3"];

/// Development script, relative to the application root
pub const DEFAULT_DEV_SCRIPT: &str = "python-yt-dl/main.py";

/// Directory under the resources directory that holds the packaged backend
pub const DEFAULT_BACKEND_DIR: &str = "python-dist";

/// Executable name used when the platform needs no extension
pub const DEFAULT_EXECUTABLE_NAME: &str = "main";

/// Where the backend lives on disk, in both runtime modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendLayout {
    /// Root of the source checkout (development mode)
    pub app_root: PathBuf,
    /// Resources directory of the packaged application
    pub resources_dir: PathBuf,
    /// Development script, relative to `app_root`
    pub dev_script: PathBuf,
    /// Interpreter candidates for the development script
    pub interpreters: Vec<String>,
    /// Backend directory, relative to `resources_dir`
    pub backend_dir: PathBuf,
}

impl BackendLayout {
    pub fn new(app_root: impl Into<PathBuf>, resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            resources_dir: resources_dir.into(),
            dev_script: PathBuf::from(DEFAULT_DEV_SCRIPT),
            interpreters: DEFAULT_INTERPRETERS.iter().map(|s| s.to_string()).collect(),
            backend_dir: PathBuf::from(DEFAULT_BACKEND_DIR),
        }
    }
}

/// Resolved launch descriptor. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableTarget {
    /// Run `script` under the first interpreter that spawns
    Development {
        script: PathBuf,
        interpreters: Vec<String>,
    },
    /// Run a bundled executable directly
    Packaged { path: PathBuf },
}

impl ExecutableTarget {
    /// Candidate command lines, in the order they should be tried
    pub fn candidates(&self) -> Vec<LaunchCommand> {
        match self {
            ExecutableTarget::Development {
                script,
                interpreters,
            } => interpreters
                .iter()
                .map(|interpreter| LaunchCommand {
                    program: PathBuf::from(interpreter),
                    args: vec![script.to_string_lossy().to_string()],
                })
                .collect(),
            ExecutableTarget::Packaged { path } => vec![LaunchCommand {
                program: path.clone(),
                args: Vec::new(),
            }],
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, ExecutableTarget::Development { .. })
    }
}

/// A single command line to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Platform-specific name of the packaged backend executable.
///
/// Never empty: unrecognised platforms get [`DEFAULT_EXECUTABLE_NAME`].
pub fn executable_name(platform: &Platform) -> &'static str {
    match platform {
        Platform::Windows => "main.exe",
        Platform::MacOs | Platform::Linux => DEFAULT_EXECUTABLE_NAME,
        Platform::Other(_) => DEFAULT_EXECUTABLE_NAME,
    }
}

/// Packaged backend path: `<resources>/<backend_dir>/<executable>`
pub fn packaged_executable_path(
    resources_dir: &Path,
    backend_dir: &Path,
    platform: &Platform,
) -> PathBuf {
    resources_dir
        .join(backend_dir)
        .join(executable_name(platform))
}

/// Resolve how to invoke the backend
pub fn resolve(mode: RuntimeMode, platform: &Platform, layout: &BackendLayout) -> ExecutableTarget {
    match mode {
        RuntimeMode::Development => ExecutableTarget::Development {
            script: layout.app_root.join(&layout.dev_script),
            interpreters: layout.interpreters.clone(),
        },
        RuntimeMode::Packaged => ExecutableTarget::Packaged {
            path: packaged_executable_path(&layout.resources_dir, &layout.backend_dir, platform),
        },
    }
}
