//! Settings parser for .deskhost/config.toml

use std::path::{Path, PathBuf};

use deskhost_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const DESKHOST_DIR: &str = ".deskhost";

const DEFAULT_CONFIG: &str = r#"# deskhost configuration

[backend]
dev_script = "python-yt-dl/main.py"     # Relative to the application root
interpreters = ["python", "python3"]    # Tried in order in development mode
backend_dir = "python-dist"             # Relative to the resources directory
base_url = "http://127.0.0.1:5000"
shutdown_timeout_ms = 5000              # Graceful exit window before a forced kill
request_timeout_ms = 2000
ready_timeout_ms = 20000

[window]
confirm_close = true                    # Ask before closing the main window
dev_url = "http://localhost:5173"
ui_dir = "pack-resources/react-dist"    # Relative to the resources directory
fallback_ui = "react-yt-dl/dist/index.html"
"#;

/// Path of the settings file for `app_root`
pub fn config_path(app_root: &Path) -> PathBuf {
    app_root.join(DESKHOST_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.deskhost/config.toml`.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(app_root: &Path) -> Settings {
    let config_path = config_path(app_root);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create `.deskhost/config.toml` with commented defaults.
///
/// An existing file is left untouched. Returns the config path.
pub fn init_config_dir(app_root: &Path) -> Result<PathBuf> {
    let deskhost_dir = app_root.join(DESKHOST_DIR);

    if !deskhost_dir.exists() {
        std::fs::create_dir_all(&deskhost_dir)
            .map_err(|e| Error::config(format!("Failed to create .deskhost dir: {}", e)))?;
    }

    let config_path = deskhost_dir.join(CONFIG_FILENAME);
    if config_path.exists() {
        info!("Config already exists at {:?}", config_path);
    } else {
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Wrote default config to {:?}", config_path);
    }

    Ok(config_path)
}
