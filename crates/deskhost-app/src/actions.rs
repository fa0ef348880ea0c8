//! Action handlers: UpdateAction dispatch and background task spawning

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use deskhost_backend::{
    BackendClient, ExecutableTarget, ProcessKiller, ShutdownRequest, Supervisor,
};
use deskhost_core::BackendEvent;

use crate::handler::UpdateAction;
use crate::message::Message;
use crate::ui_load;
use crate::window::HostWindow;

/// Interval between readiness probes
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Everything the backend actions need, shared with spawned tasks
pub struct BackendContext<R, K> {
    pub supervisor: Arc<Supervisor<R, K>>,
    pub client: BackendClient,
    pub target: ExecutableTarget,
    pub ready_timeout: Duration,
    /// Client used for main-frame load checks
    pub ui_http: reqwest::Client,
}

/// Execute an action, spawning background work where needed.
///
/// Returns a follow-up message when the action completes synchronously. The
/// caller must process it before anything already queued on the channel.
pub fn handle_action<W, R, K>(
    action: UpdateAction,
    msg_tx: &mpsc::Sender<Message>,
    window: &W,
    backend: &BackendContext<R, K>,
) -> Option<Message>
where
    W: HostWindow + ?Sized,
    R: ShutdownRequest + Send + Sync + 'static,
    K: ProcessKiller + 'static,
{
    match action {
        UpdateAction::LaunchBackend => return Some(launch_backend(msg_tx, backend)),

        UpdateAction::StopBackend => {
            let supervisor = Arc::clone(&backend.supervisor);
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                let outcome = supervisor.stop().await;
                let _ = tx.send(Message::ShutdownComplete(outcome)).await;
            });
        }

        UpdateAction::ProbeReadiness => {
            let supervisor = Arc::clone(&backend.supervisor);
            let client = backend.client.clone();
            let timeout = backend.ready_timeout;
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                if supervisor
                    .wait_until_ready(&client, timeout, READY_POLL_INTERVAL)
                    .await
                {
                    let _ = tx.send(Message::BackendReady).await;
                }
            });
        }

        UpdateAction::ShowConfirmDialog(dialog) => window.show_confirmation(&dialog),

        UpdateAction::ShowError { title, message } => window.show_error(&title, &message),

        UpdateAction::LoadLocation(location) => {
            window.load(&location);
            spawn_load_check(location, backend.ui_http.clone(), msg_tx.clone());
        }

        UpdateAction::CloseWindow => window.close(),
    }
    None
}

fn launch_backend<R, K>(msg_tx: &mpsc::Sender<Message>, backend: &BackendContext<R, K>) -> Message
where
    R: ShutdownRequest + Send + Sync + 'static,
    K: ProcessKiller + 'static,
{
    let (event_tx, mut event_rx) = mpsc::channel::<BackendEvent>(256);

    match backend.supervisor.launch(&backend.target, event_tx) {
        Ok(info) => {
            // Forward process output and the exit into the message loop
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    if tx.send(Message::Backend(event)).await.is_err() {
                        break;
                    }
                }
            });

            Message::BackendStarted {
                pid: info.pid,
                command: info.command.to_string(),
            }
        }
        Err(e) => Message::BackendStartFailed {
            reason: e.to_string(),
            user_visible: !backend.target.is_development() && e.is_user_visible(),
        },
    }
}

fn spawn_load_check(location: String, http: reqwest::Client, msg_tx: mpsc::Sender<Message>) {
    if !ui_load::needs_check(&location) {
        return;
    }

    tokio::spawn(async move {
        let msg = match ui_load::check_location(&http, &location).await {
            Ok(()) => Message::UiLoaded { url: location },
            Err(failure) => Message::UiLoadFailed {
                url: location,
                code: failure.code,
                description: failure.description,
            },
        };
        let _ = msg_tx.send(msg).await;
    });
}
