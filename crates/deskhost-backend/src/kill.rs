//! Forced process-tree termination

use std::process::Stdio;

use tokio::process::Command;

use deskhost_core::prelude::*;
use deskhost_core::Platform;

/// Issues forced-termination commands.
///
/// `force_kill` only *issues* the command. Whether the process actually died
/// is observed through its exit event, never through this call.
#[cfg_attr(any(test, feature = "test-helpers"), mockall::automock)]
pub trait ProcessKiller: Send + Sync {
    /// Kill `pid` and everything it spawned
    fn force_kill(&self, pid: u32) -> Result<()>;
}

/// A platform tree-kill command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// Build the tree-kill command for `pid` on `platform`.
///
/// Windows uses `taskkill /T /F`. Elsewhere the backend leads its own
/// process group, so `kill -KILL -- -<pid>` signals the whole group.
pub fn tree_kill_command(platform: &Platform, pid: u32) -> KillCommand {
    if platform.is_windows() {
        KillCommand {
            program: "taskkill",
            args: vec![
                "/pid".to_string(),
                pid.to_string(),
                "/T".to_string(),
                "/F".to_string(),
            ],
        }
    } else {
        KillCommand {
            program: "kill",
            args: vec!["-KILL".to_string(), "--".to_string(), format!("-{}", pid)],
        }
    }
}

/// Kills process trees with the platform's own tools
#[derive(Debug, Clone)]
pub struct SystemKiller {
    platform: Platform,
}

impl SystemKiller {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for SystemKiller {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl ProcessKiller for SystemKiller {
    fn force_kill(&self, pid: u32) -> Result<()> {
        let kill = tree_kill_command(&self.platform, pid);
        warn!("Force killing backend process tree: {} {}", kill.program, kill.args.join(" "));

        let child = Command::new(kill.program)
            .args(&kill.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::kill(pid, e.to_string()))?;

        // Report the kill tool's result in the background; callers don't wait on it
        tokio::spawn(async move {
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    debug!("Kill command for pid {} succeeded", pid);
                }
                Ok(output) => {
                    warn!(
                        "Kill command for pid {} exited with {}: {}",
                        pid,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Err(e) => warn!("Kill command for pid {} failed: {}", pid, e),
            }
        });

        Ok(())
    }
}
