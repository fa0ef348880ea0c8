//! Engine - owns the message loop that binds the backend to the window
//!
//! The Engine holds the TEA state, the message channel, the backend
//! supervisor, and the host window. Frontends feed it messages (window
//! events, signals, dialog answers) and it runs updates and dispatches the
//! resulting actions.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use deskhost_backend::{
    resolve, BackendClient, ProcessKiller, ShutdownRequest, Supervisor, SystemKiller,
};
use deskhost_core::prelude::*;
use deskhost_core::{Platform, RuntimeMode};

use crate::actions::{self, BackendContext};
use crate::config;
use crate::handler;
use crate::message::Message;
use crate::signals;
use crate::state::{AppState, ShutdownState};
use crate::ui_load::DEFAULT_LOAD_TIMEOUT;
use crate::ui_source::resolve_ui_source;
use crate::window::HostWindow;

/// Orchestration engine for the shell
pub struct Engine<W, R = BackendClient, K = SystemKiller> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the message channel.
    /// Clone this to give to input sources (signal handler, window events).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the message channel
    pub msg_rx: mpsc::Receiver<Message>,

    backend: BackendContext<R, K>,
    window: W,
}

impl<W: HostWindow> Engine<W> {
    /// Build the engine for the application at `app_root`.
    ///
    /// Loads settings, resolves the UI source and the backend target, and
    /// spawns the signal handler. Nothing is launched until [`Engine::run`].
    pub fn bootstrap(
        mode: RuntimeMode,
        app_root: &Path,
        resources_dir: &Path,
        window: W,
    ) -> Result<Self> {
        let settings = config::load_settings(app_root);

        let ui = resolve_ui_source(mode, app_root, resources_dir, &settings.window)?;

        let client = BackendClient::new(
            &settings.backend.base_url,
            settings.backend.request_timeout(),
        )?;
        let supervisor = Supervisor::new(client.clone(), SystemKiller::default())
            .with_shutdown_timeout(settings.backend.shutdown_timeout());

        let layout = settings.backend.layout(app_root, resources_dir);
        let target = resolve(mode, &Platform::current(), &layout);

        let ui_http = reqwest::Client::builder()
            .timeout(DEFAULT_LOAD_TIMEOUT)
            .build()
            .map_err(|e| Error::http(e.to_string()))?;

        let backend = BackendContext {
            supervisor: Arc::new(supervisor),
            client,
            target,
            ready_timeout: settings.backend.ready_timeout(),
            ui_http,
        };

        let state = AppState::new(mode, settings).with_ui_location(ui.location());
        let engine = Self::new(state, backend, window);

        signals::spawn_signal_handler(engine.msg_sender());

        Ok(engine)
    }
}

impl<W, R, K> Engine<W, R, K>
where
    W: HostWindow,
    R: ShutdownRequest + Send + Sync + 'static,
    K: ProcessKiller + 'static,
{
    pub fn new(state: AppState, backend: BackendContext<R, K>, window: W) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);

        Self {
            state,
            msg_tx,
            msg_rx,
            backend,
            window,
        }
    }

    pub fn supervisor(&self) -> &Arc<Supervisor<R, K>> {
        &self.backend.supervisor
    }

    /// Process a message and its follow-ups, dispatching every action.
    ///
    /// An action's own result (a launch outcome) runs before the update's
    /// follow-up message, and both run before anything on the channel.
    pub fn process_message(&mut self, message: Message) {
        let mut queue = VecDeque::from([message]);
        while let Some(msg) = queue.pop_front() {
            let result = handler::update(&mut self.state, msg);

            if let Some(action) = result.action {
                if let Some(follow_up) =
                    actions::handle_action(action, &self.msg_tx, &self.window, &self.backend)
                {
                    queue.push_back(follow_up);
                }
            }

            if let Some(next) = result.message {
                queue.push_back(next);
            }
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Start the shell and process messages until it quits
    pub async fn run(&mut self) {
        info!("Starting shell ({} mode)", self.state.mode);
        self.process_message(Message::Startup);

        while !self.should_quit() {
            let Some(msg) = self.msg_rx.recv().await else {
                break;
            };
            self.process_message(msg);
        }

        // The supervisor, not the state copy, decides whether a backend is left
        let stop_completed = matches!(self.state.shutdown, ShutdownState::Done(_));
        if self.supervisor().is_running() && !stop_completed {
            warn!("Quitting with a live backend, stopping it first");
            self.state.shutdown = ShutdownState::InFlight;
            let outcome = self.supervisor().stop().await;
            self.state.shutdown = ShutdownState::Done(outcome);
        }

        if self.state.window_open {
            self.state.window_open = false;
            self.window.close();
        }
        info!("Shell stopped");
    }
}
