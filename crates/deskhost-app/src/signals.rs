//! OS signal handling
//!
//! Interrupts (SIGINT, Ctrl+C) behave like closing the window and prompt
//! when configured; a repeated interrupt while that prompt is open quits.
//! SIGTERM and Ctrl+Break behave like an OS quit.

use tokio::sync::mpsc;

use deskhost_core::prelude::*;

use crate::message::Message;

/// Spawn a task that turns OS signals into lifecycle messages
pub fn spawn_signal_handler(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        if let Err(e) = forward_signals(&tx).await {
            error!("Signal handler error: {}", e);
        }
    });
}

/// Forward signals until the receiver goes away
async fn forward_signals(tx: &mpsc::Sender<Message>) -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| Error::signal(format!("Failed to create SIGINT handler: {}", e)))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| Error::signal(format!("Failed to create SIGTERM handler: {}", e)))?;

        loop {
            let msg = tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT");
                    Message::Interrupt
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM");
                    Message::BeforeQuit
                }
            };

            if tx.send(msg).await.is_err() {
                return Ok(());
            }
        }
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c};

        let mut interrupt =
            ctrl_c().map_err(|e| Error::signal(format!("Failed to listen for Ctrl+C: {}", e)))?;
        let mut brk = ctrl_break()
            .map_err(|e| Error::signal(format!("Failed to listen for Ctrl+Break: {}", e)))?;

        loop {
            let msg = tokio::select! {
                _ = interrupt.recv() => {
                    info!("Received Ctrl+C");
                    Message::Interrupt
                }
                _ = brk.recv() => {
                    info!("Received Ctrl+Break");
                    Message::BeforeQuit
                }
            };

            if tx.send(msg).await.is_err() {
                return Ok(());
            }
        }
    }
}
