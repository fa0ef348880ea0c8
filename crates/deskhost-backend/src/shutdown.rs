//! Graceful-then-forced shutdown coordination
//!
//! One stop attempt: ask the backend to exit over HTTP, race its exit against
//! a deadline, and fall back to a forced tree kill when the deadline wins.

use std::time::Duration;

use deskhost_core::prelude::*;
use deskhost_core::ShutdownOutcome;

use crate::client::ShutdownRequest;
use crate::kill::ProcessKiller;
use crate::process::ExitWatch;

/// Upper bound on how long a graceful exit is awaited
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Run one stop attempt against the process behind `watch`.
///
/// The graceful request runs concurrently with the exit/deadline race, so the
/// window is exactly `timeout` no matter how long the request takes. The exit
/// wins a tie with the deadline. At most one kill command is issued.
pub async fn coordinate<R, K>(
    watch: &ExitWatch,
    requester: &R,
    killer: &K,
    timeout: Duration,
) -> ShutdownOutcome
where
    R: ShutdownRequest,
    K: ProcessKiller + ?Sized,
{
    if watch.has_exited() {
        info!("No backend process to stop");
        return ShutdownOutcome::AlreadyStopped;
    }

    info!(
        "Stopping backend (pid {:?}), waiting up to {:?}",
        watch.pid(),
        timeout
    );

    let exited = watch.exited();
    let request = requester.request_shutdown();
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(exited, request, deadline);

    let mut request_pending = true;
    loop {
        tokio::select! {
            biased;

            _ = &mut exited => {
                info!("Backend exited gracefully");
                return ShutdownOutcome::Graceful;
            }
            result = &mut request, if request_pending => {
                request_pending = false;
                match result {
                    Ok(()) => debug!("Shutdown request delivered"),
                    Err(e) => info!("Backend not responding to graceful shutdown: {}", e),
                }
            }
            _ = &mut deadline => break,
        }
    }

    warn!("Backend did not exit within {:?}, forcing termination", timeout);

    let Some(pid) = watch.pid() else {
        error!("Backend process id unknown, cannot force termination");
        return ShutdownOutcome::FailedToStop;
    };

    if let Err(e) = killer.force_kill(pid) {
        error!("Failed to issue kill for backend pid {}: {}", pid, e);
    }
    ShutdownOutcome::ForcedAttempted
}
