//! Backend process management

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;

use deskhost_core::prelude::*;
use deskhost_core::BackendEvent;

use crate::resolver::LaunchCommand;

/// How long the exit event waits for remaining output
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Shared view of whether a process has exited.
///
/// Cheap to clone. The wait task of a [`BackendProcess`] marks it exited;
/// anyone holding a clone can check synchronously or await the exit.
#[derive(Debug, Clone)]
pub struct ExitWatch {
    pid: Option<u32>,
    exited: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ExitWatch {
    pub fn new(pid: Option<u32>) -> Self {
        Self {
            pid,
            exited: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Record the exit and wake every waiter
    pub fn mark_exited(&self) {
        self.exited.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Resolve once the process has exited. Returns immediately if it already has.
    pub async fn exited(&self) {
        // Register before checking the flag so a concurrent `mark_exited`
        // cannot slip between the check and the await.
        let notified = self.notify.notified();
        if self.has_exited() {
            return;
        }
        notified.await;
    }
}

/// A running backend child process.
///
/// The `Child` handle lives in a dedicated wait task, which emits exactly one
/// terminal [`BackendEvent`] (`Exited` or `Failed`) once the process is gone.
/// `BackendProcess` keeps a kill channel for teardown and an [`ExitWatch`]
/// for synchronous and async exit checks.
pub struct BackendProcess {
    command: LaunchCommand,
    watch: ExitWatch,
    /// Tells the wait task to kill the direct child. Consumed on drop.
    kill_tx: Option<oneshot::Sender<()>>,
    started_at: Instant,
}

impl BackendProcess {
    /// Spawn `command`, forwarding output and the exit to `event_tx`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(command: &LaunchCommand, event_tx: mpsc::Sender<BackendEvent>) -> Result<Self> {
        debug!("Spawning backend: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a tree kill reaches the backend's children too
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ExecutableNotFound {
                    path: command.program.clone(),
                }
            } else {
                Error::process_spawn(command.to_string(), e.to_string())
            }
        })?;

        let pid = child.id();
        info!("Backend process started with PID: {:?}", pid);

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(Self::stdout_reader(stdout, event_tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(Self::stderr_reader(stderr, event_tx.clone())));
        }

        let watch = ExitWatch::new(pid);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(Self::wait_for_exit(
            child,
            kill_rx,
            readers,
            event_tx,
            watch.clone(),
        ));

        Ok(Self {
            command: command.clone(),
            watch,
            kill_tx: Some(kill_tx),
            started_at: Instant::now(),
        })
    }

    /// Track a process that is observed only through `watch`.
    ///
    /// There is no child to kill on drop. Used to drive the supervisor
    /// without spawning real processes.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn from_watch(command: LaunchCommand, watch: ExitWatch) -> Self {
        Self {
            command,
            watch,
            kill_tx: None,
            started_at: Instant::now(),
        }
    }

    /// Background task: owns `child`, waits for it to exit, emits the terminal event
    async fn wait_for_exit(
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        readers: Vec<JoinHandle<()>>,
        event_tx: mpsc::Sender<BackendEvent>,
        watch: ExitWatch,
    ) {
        let result = tokio::select! {
            result = child.wait() => result,
            _ = kill_rx => {
                info!("Kill signal received, terminating backend process");
                if let Err(e) = child.kill().await {
                    error!("Failed to kill backend process: {}", e);
                }
                child.wait().await
            }
        };

        let event = match result {
            Ok(status) => {
                info!("Backend process exited with status: {}", status);
                BackendEvent::Exited {
                    code: status.code(),
                    signal: exit_signal(&status),
                }
            }
            Err(e) => {
                error!("Error waiting for backend process: {}", e);
                BackendEvent::Failed {
                    reason: e.to_string(),
                }
            }
        };

        // Flag first, so `has_exited()` is true before anyone sees the event
        watch.mark_exited();

        // Output precedes the exit event, unless a grandchild keeps the pipes open
        if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, join_all(readers))
            .await
            .is_err()
        {
            debug!("Backend output still open after exit, not waiting for it");
        }

        debug!("Sending {:?}", event);
        let _ = event_tx.send(event).await;
    }

    async fn stdout_reader(stdout: tokio::process::ChildStdout, tx: mpsc::Sender<BackendEvent>) {
        let mut reader = BufReader::new(stdout).lines();

        while let Ok(Some(line)) = reader.next_line().await {
            trace!("stdout: {}", line);

            if tx.send(BackendEvent::Stdout(line)).await.is_err() {
                debug!("stdout channel closed");
                break;
            }
        }

        debug!("stdout reader finished");
    }

    async fn stderr_reader(stderr: tokio::process::ChildStderr, tx: mpsc::Sender<BackendEvent>) {
        let mut reader = BufReader::new(stderr).lines();

        while let Ok(Some(line)) = reader.next_line().await {
            trace!("stderr: {}", line);

            if tx.send(BackendEvent::Stderr(line)).await.is_err() {
                debug!("stderr channel closed");
                break;
            }
        }

        debug!("stderr reader finished");
    }

    pub fn id(&self) -> Option<u32> {
        self.watch.pid()
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    /// A clone of this process's exit watch
    pub fn exit_watch(&self) -> ExitWatch {
        self.watch.clone()
    }

    pub fn has_exited(&self) -> bool {
        self.watch.has_exited()
    }

    pub fn is_running(&self) -> bool {
        !self.has_exited()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        if !self.has_exited() {
            if let Some(tx) = self.kill_tx.take() {
                warn!("BackendProcess dropped while process may still be running");
                let _ = tx.send(());
            }
        }
        debug!("BackendProcess dropped");
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
