//! Configuration file parsing for deskhost
//!
//! Supports `.deskhost/config.toml` under the application root.

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings};
pub use types::*;
