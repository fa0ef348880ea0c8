//! # deskhost-backend - Backend Process Supervision
//!
//! Resolves, spawns, and stops the local HTTP backend that serves the shell's
//! UI. Depends on [`deskhost_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Resolution (`resolver`)
//! - [`resolve()`] - Pick a development or packaged [`ExecutableTarget`]
//! - [`executable_name()`] - Platform-specific packaged executable name
//!
//! ### Launching (`launcher`, `process`)
//! - [`launch()`] - Try candidates in order, first successful spawn wins
//! - [`BackendProcess`] - Spawned child with output forwarding and exit tracking
//! - [`ExitWatch`] - Shared, awaitable "has exited" flag
//!
//! ### Stopping (`shutdown`, `kill`)
//! - [`coordinate()`] - Graceful request, bounded wait, forced tree kill
//! - [`ProcessKiller`] / [`SystemKiller`] - Platform tree-kill commands
//!
//! ### Supervision (`supervisor`)
//! - [`Supervisor`] - Single tracked backend with single-flight stop
//!
//! ### HTTP (`client`)
//! - [`BackendClient`] - `hello`, `create_user`, and the shutdown request

pub mod client;
pub mod kill;
pub mod launcher;
pub mod process;
pub mod resolver;
pub mod shutdown;
pub mod supervisor;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use client::{
    BackendClient, Hello, LocalShutdownRequest, ShutdownRequest, User, DEFAULT_BASE_URL,
};
#[cfg(any(test, feature = "test-helpers"))]
pub use kill::MockProcessKiller;
pub use kill::{tree_kill_command, KillCommand, ProcessKiller, SystemKiller};
pub use launcher::{launch, Launched};
pub use process::{BackendProcess, ExitWatch};
pub use resolver::{
    executable_name, resolve, BackendLayout, ExecutableTarget, LaunchCommand,
    DEFAULT_BACKEND_DIR, DEFAULT_DEV_SCRIPT, DEFAULT_INTERPRETERS,
};
pub use shutdown::{coordinate, DEFAULT_SHUTDOWN_TIMEOUT};
pub use supervisor::{LaunchInfo, Supervisor};
