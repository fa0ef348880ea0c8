//! # deskhost-core - Core Domain Types
//!
//! Foundation crate for deskhost. Provides domain types, error handling,
//! backend process events, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (thiserror, serde_json, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`RuntimeMode`] - Development (script + interpreter) vs packaged (bundled binary)
//! - [`Platform`] - Operating system family, parsed from an OS identifier
//! - [`ShutdownOutcome`] - Result of a backend stop request
//!
//! ### Events (`events`)
//! - [`BackendEvent`] - stdout/stderr lines and the single terminal exit event
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with a `user_visible` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use deskhost_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use events::BackendEvent;
pub use types::{Platform, RuntimeMode, ShutdownOutcome, MODE_ENV};
