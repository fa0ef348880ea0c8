//! Backend supervisor
//!
//! Owns the single tracked backend process. Launch refuses to start a second
//! backend; stop is single-flight, so concurrent and repeated stop calls
//! share one coordinated attempt and never issue a second kill.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::mpsc;

use deskhost_core::prelude::*;
use deskhost_core::{BackendEvent, ShutdownOutcome};

use crate::client::{BackendClient, ShutdownRequest};
use crate::kill::{ProcessKiller, SystemKiller};
use crate::launcher;
use crate::process::BackendProcess;
use crate::resolver::{ExecutableTarget, LaunchCommand};
use crate::shutdown::{self, DEFAULT_SHUTDOWN_TIMEOUT};

type StopFuture = Shared<BoxFuture<'static, ShutdownOutcome>>;

/// Summary of a successful launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchInfo {
    pub command: LaunchCommand,
    pub pid: Option<u32>,
    /// Zero-based candidate index that spawned
    pub attempt: usize,
}

struct Tracked {
    generation: u64,
    process: BackendProcess,
    ready: bool,
    /// The stop attempt for this process, once one has started
    stop: Option<StopFuture>,
}

/// Supervises the backend process for the lifetime of the shell
pub struct Supervisor<R = BackendClient, K = SystemKiller> {
    requester: Arc<R>,
    killer: Arc<K>,
    slot: Arc<Mutex<Option<Tracked>>>,
    generation: AtomicU64,
    shutdown_timeout: Duration,
}

impl<R, K> Supervisor<R, K>
where
    R: ShutdownRequest + Send + Sync + 'static,
    K: ProcessKiller + 'static,
{
    pub fn new(requester: R, killer: K) -> Self {
        Self {
            requester: Arc::new(requester),
            killer: Arc::new(killer),
            slot: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Tracked>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve and spawn the backend, then track it.
    ///
    /// Fails with [`Error::AlreadyRunning`] while a backend is tracked.
    pub fn launch(
        &self,
        target: &ExecutableTarget,
        event_tx: mpsc::Sender<BackendEvent>,
    ) -> Result<LaunchInfo> {
        if let Some(tracked) = self.lock_slot().as_ref() {
            if tracked.process.is_running() {
                return Err(Error::AlreadyRunning {
                    pid: tracked.process.id(),
                });
            }
        }

        let launched =
            launcher::launch(target, |command| BackendProcess::spawn(command, event_tx.clone()))?;

        let info = LaunchInfo {
            command: launched.command,
            pid: launched.value.id(),
            attempt: launched.attempt,
        };
        self.track(launched.value);
        Ok(info)
    }

    /// Start tracking `process`, replacing any exited predecessor.
    ///
    /// The reference is cleared automatically when the process exits.
    pub fn track(&self, process: BackendProcess) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let watch = process.exit_watch();

        let previous = self.lock_slot().replace(Tracked {
            generation,
            process,
            ready: false,
            stop: None,
        });
        if let Some(previous) = previous {
            debug!(
                "Replacing backend reference (pid {:?})",
                previous.process.id()
            );
        }

        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            watch.exited().await;
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|t| t.generation == generation) {
                let tracked = slot.take();
                drop(slot);
                if let Some(tracked) = tracked {
                    info!(
                        "Backend process exited after {:?}, reference cleared",
                        tracked.process.uptime()
                    );
                }
            }
        });
    }

    pub fn is_running(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .is_some_and(|t| t.process.is_running())
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock_slot()
            .as_ref()
            .filter(|t| t.process.is_running())
            .and_then(|t| t.process.id())
    }

    /// Whether the running backend has answered a readiness probe
    pub fn is_ready(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .is_some_and(|t| t.ready && t.process.is_running())
    }

    pub fn mark_ready(&self) {
        if let Some(tracked) = self.lock_slot().as_mut() {
            tracked.ready = true;
        }
    }

    /// Stop the backend with the configured timeout
    pub async fn stop(&self) -> ShutdownOutcome {
        self.stop_with_timeout(self.shutdown_timeout).await
    }

    /// Stop the backend, joining any stop already in flight.
    ///
    /// `timeout` only applies when this call starts the attempt.
    pub async fn stop_with_timeout(&self, timeout: Duration) -> ShutdownOutcome {
        let pending = {
            let mut slot = self.lock_slot();
            let Some(tracked) = slot.as_mut().filter(|t| t.process.is_running()) else {
                info!("No backend process to stop");
                return ShutdownOutcome::AlreadyStopped;
            };

            match &tracked.stop {
                Some(stop) => {
                    debug!("Joining in-flight backend stop");
                    stop.clone()
                }
                None => {
                    let watch = tracked.process.exit_watch();
                    let requester = Arc::clone(&self.requester);
                    let killer = Arc::clone(&self.killer);
                    let stop = async move {
                        shutdown::coordinate(&watch, requester.as_ref(), killer.as_ref(), timeout)
                            .await
                    }
                    .boxed()
                    .shared();
                    tracked.stop = Some(stop.clone());
                    stop
                }
            }
        };

        pending.await
    }

    /// Poll `client` until the backend answers, the process exits, or
    /// `timeout` elapses. Marks the backend ready on success.
    pub async fn wait_until_ready(
        &self,
        client: &BackendClient,
        timeout: Duration,
        interval: Duration,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if !self.is_running() {
                debug!("Backend gone before becoming ready");
                return false;
            }

            match client.hello().await {
                Ok(hello) => {
                    info!("Backend ready: {}", hello.msg);
                    self.mark_ready();
                    return true;
                }
                Err(e) => trace!("Backend not ready yet: {}", e),
            }

            if tokio::time::Instant::now() + interval > deadline {
                warn!("Backend did not become ready within {:?}", timeout);
                return false;
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kill::MockProcessKiller;
    use crate::test_utils::{detached_process, serve_once, FakeShutdown, ShutdownBehavior};
    use std::path::PathBuf;
    use tokio_test::{assert_pending, assert_ready_eq};

    fn supervisor(
        requester: FakeShutdown,
        killer: MockProcessKiller,
    ) -> Supervisor<FakeShutdown, MockProcessKiller> {
        Supervisor::new(requester, killer)
    }

    fn no_kill() -> MockProcessKiller {
        let mut killer = MockProcessKiller::new();
        killer.expect_force_kill().times(0);
        killer
    }

    fn one_kill(pid: u32) -> MockProcessKiller {
        let mut killer = MockProcessKiller::new();
        killer
            .expect_force_kill()
            .withf(move |p| *p == pid)
            .times(1)
            .returning(|_| Ok(()));
        killer
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle() {
        let requester = FakeShutdown::new(ShutdownBehavior::Accept);
        let supervisor = supervisor(requester.clone(), no_kill());

        assert_eq!(supervisor.stop().await, ShutdownOutcome::AlreadyStopped);
        assert_eq!(requester.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_stop_then_stop_again() {
        let (process, watch) = detached_process(100);
        let requester = FakeShutdown::new(ShutdownBehavior::Accept)
            .exiting(watch.clone(), Duration::from_millis(200));
        let supervisor = supervisor(requester.clone(), no_kill());
        supervisor.track(process);

        assert_eq!(supervisor.stop().await, ShutdownOutcome::Graceful);
        assert_eq!(supervisor.stop().await, ShutdownOutcome::AlreadyStopped);
        assert_eq!(requester.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_stops_share_one_kill() {
        let (process, _watch) = detached_process(4242);
        let requester = FakeShutdown::new(ShutdownBehavior::Refuse);
        let supervisor = supervisor(requester.clone(), one_kill(4242));
        supervisor.track(process);

        let (a, b) = tokio::join!(supervisor.stop(), supervisor.stop());

        assert_eq!(a, ShutdownOutcome::ForcedAttempted);
        assert_eq!(b, ShutdownOutcome::ForcedAttempted);
        assert_eq!(requester.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_forced_attempt_does_not_kill_twice() {
        let (process, watch) = detached_process(4242);
        let requester = FakeShutdown::new(ShutdownBehavior::Hang);
        let supervisor = supervisor(requester.clone(), one_kill(4242));
        supervisor.track(process);

        assert_eq!(supervisor.stop().await, ShutdownOutcome::ForcedAttempted);
        // Kill issued but the death hasn't been observed yet
        assert!(supervisor.is_running());
        assert_eq!(supervisor.stop().await, ShutdownOutcome::ForcedAttempted);

        watch.mark_exited();
        tokio::task::yield_now().await;
        assert_eq!(supervisor.stop().await, ShutdownOutcome::AlreadyStopped);
        assert_eq!(requester.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_stop_joins_in_flight_attempt() {
        let (process, watch) = detached_process(7);
        let requester = FakeShutdown::new(ShutdownBehavior::Accept);
        let supervisor = Arc::new(supervisor(requester.clone(), no_kill()));
        supervisor.track(process);

        let mut first = tokio_test::task::spawn({
            let supervisor = Arc::clone(&supervisor);
            async move { supervisor.stop().await }
        });
        assert_pending!(first.poll());

        let second = tokio::spawn({
            let supervisor = Arc::clone(&supervisor);
            async move { supervisor.stop().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        watch.mark_exited();
        assert_ready_eq!(first.poll(), ShutdownOutcome::Graceful);
        assert_eq!(second.await.unwrap(), ShutdownOutcome::Graceful);
        assert_eq!(requester.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_clears_reference() {
        let (process, watch) = detached_process(55);
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        supervisor.track(process);
        assert!(supervisor.is_running());
        assert_eq!(supervisor.pid(), Some(55));

        watch.mark_exited();
        tokio::task::yield_now().await;

        assert!(!supervisor.is_running());
        assert_eq!(supervisor.pid(), None);
        assert!(supervisor.lock_slot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_monitor_keeps_new_process() {
        let (first, first_watch) = detached_process(1);
        let (second, _second_watch) = detached_process(2);
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());

        supervisor.track(first);
        supervisor.track(second);
        first_watch.mark_exited();
        tokio::task::yield_now().await;

        assert_eq!(supervisor.pid(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_flag_follows_process() {
        let (process, watch) = detached_process(9);
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        supervisor.track(process);

        assert!(!supervisor.is_ready());
        supervisor.mark_ready();
        assert!(supervisor.is_ready());

        watch.mark_exited();
        assert!(!supervisor.is_ready());
    }

    #[tokio::test]
    async fn test_launch_refuses_second_backend() {
        let (process, _watch) = detached_process(300);
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        supervisor.track(process);

        let (tx, _rx) = mpsc::channel(4);
        let target = ExecutableTarget::Packaged {
            path: PathBuf::from("/nonexistent/main"),
        };
        let result = supervisor.launch(&target, tx);

        assert!(matches!(result, Err(Error::AlreadyRunning { pid: Some(300) })));
    }

    #[tokio::test]
    async fn test_launch_missing_packaged_executable() {
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        let (tx, _rx) = mpsc::channel(4);
        let target = ExecutableTarget::Packaged {
            path: PathBuf::from("/nonexistent/deskhost/main"),
        };

        let result = supervisor.launch(&target, tx);

        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
        assert!(!supervisor.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_falls_back_to_second_interpreter() {
        let temp = tempfile::tempdir().unwrap();
        let script = temp.path().join("main.py");
        std::fs::write(&script, "sleep 30\n").unwrap();

        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        let (tx, _rx) = mpsc::channel(16);
        let target = ExecutableTarget::Development {
            script,
            interpreters: vec!["deskhost-no-such-python".to_string(), "sh".to_string()],
        };

        let info = supervisor.launch(&target, tx).unwrap();

        assert_eq!(info.attempt, 1);
        assert_eq!(info.command.program, PathBuf::from("sh"));
        assert!(supervisor.is_running());
    }

    #[tokio::test]
    async fn test_wait_until_ready_marks_ready() {
        let (process, _watch) = detached_process(12);
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        supervisor.track(process);

        let (base, _request) = serve_once(200, r#"{"msg":"Hello from Python backend!"}"#).await;
        let client = BackendClient::new(&base, Duration::from_secs(2)).unwrap();

        let ready = supervisor
            .wait_until_ready(&client, Duration::from_secs(5), Duration::from_millis(50))
            .await;

        assert!(ready);
        assert!(supervisor.is_ready());
    }

    #[tokio::test]
    async fn test_wait_until_ready_gives_up_when_process_gone() {
        let supervisor = supervisor(FakeShutdown::new(ShutdownBehavior::Accept), no_kill());
        let client = BackendClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();

        let ready = supervisor
            .wait_until_ready(&client, Duration::from_secs(5), Duration::from_millis(50))
            .await;

        assert!(!ready);
    }
}
