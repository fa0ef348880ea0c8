//! Configuration types for deskhost
//!
//! Defines:
//! - `Settings` - Top-level `.deskhost/config.toml`
//! - `BackendSettings` - Backend launch, HTTP, and shutdown tuning
//! - `WindowSettings` - Close confirmation and UI locations

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use deskhost_backend::{
    BackendLayout, DEFAULT_BACKEND_DIR, DEFAULT_BASE_URL, DEFAULT_DEV_SCRIPT,
    DEFAULT_INTERPRETERS,
};

/// Application settings (.deskhost/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub window: WindowSettings,
}

/// Backend process settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Development script, relative to the application root
    #[serde(default = "default_dev_script")]
    pub dev_script: PathBuf,

    /// Interpreters tried in order for the development script
    #[serde(default = "default_interpreters")]
    pub interpreters: Vec<String>,

    /// Packaged backend directory, relative to the resources directory
    #[serde(default = "default_backend_dir")]
    pub backend_dir: PathBuf,

    /// Base URL of the backend's HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// How long a graceful exit is awaited before forcing termination
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How long to wait for the backend to answer its first request
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            dev_script: default_dev_script(),
            interpreters: default_interpreters(),
            backend_dir: default_backend_dir(),
            base_url: default_base_url(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

impl BackendSettings {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Backend layout rooted at `app_root` and `resources_dir`
    pub fn layout(
        &self,
        app_root: impl Into<PathBuf>,
        resources_dir: impl Into<PathBuf>,
    ) -> BackendLayout {
        let mut layout = BackendLayout::new(app_root, resources_dir);
        layout.dev_script = self.dev_script.clone();
        layout.backend_dir = self.backend_dir.clone();
        if !self.interpreters.is_empty() {
            layout.interpreters = self.interpreters.clone();
        }
        layout
    }
}

/// Window behaviour and UI locations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowSettings {
    /// Ask before closing the main window
    #[serde(default = "default_true")]
    pub confirm_close: bool,

    /// UI dev server used in development mode
    #[serde(default = "default_dev_url")]
    pub dev_url: String,

    /// Packaged UI directory, relative to the resources directory
    #[serde(default = "default_ui_dir")]
    pub ui_dir: PathBuf,

    /// UI entry point used when the packaged one is missing, relative to the application root
    #[serde(default = "default_fallback_ui")]
    pub fallback_ui: PathBuf,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            confirm_close: true,
            dev_url: default_dev_url(),
            ui_dir: default_ui_dir(),
            fallback_ui: default_fallback_ui(),
        }
    }
}

fn default_dev_script() -> PathBuf {
    PathBuf::from(DEFAULT_DEV_SCRIPT)
}

fn default_interpreters() -> Vec<String> {
    DEFAULT_INTERPRETERS.iter().map(|s| s.to_string()).collect()
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BACKEND_DIR)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_ready_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

fn default_dev_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_ui_dir() -> PathBuf {
    PathBuf::from("pack-resources/react-dist")
}

fn default_fallback_ui() -> PathBuf {
    PathBuf::from("react-yt-dl/dist/index.html")
}
