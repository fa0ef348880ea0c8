//! Console runner - drives the engine with stdin commands

use std::path::Path;

use tokio::sync::mpsc;

use deskhost_app::{Engine, Message};
use deskhost_core::prelude::*;
use deskhost_core::RuntimeMode;

use super::{ConsoleWindow, PendingPrompt};

/// Run the shell with the console frontend until it quits
pub async fn run_console(mode: RuntimeMode, app_root: &Path, resources_dir: &Path) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("deskhost starting in {} mode", mode);
    info!("Application root: {}", app_root.display());
    info!("Resources: {}", resources_dir.display());
    info!("═══════════════════════════════════════════════════════");

    let prompt = PendingPrompt::default();
    let window = ConsoleWindow::new(prompt.clone());
    let mut engine = Engine::bootstrap(mode, app_root, resources_dir, window)
        .context("Failed to start the shell")?;

    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(stdin_tx, prompt);
    });

    engine.run().await;

    info!("deskhost exiting");
    Ok(())
}

/// Map one stdin line to a message
pub fn parse_command(line: &str, prompt: &PendingPrompt) -> Option<Message> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if prompt.is_pending() {
        if let Some(msg) = prompt.answer(trimmed) {
            return Some(msg);
        }
    }

    match trimmed {
        "c" | "close" => Some(Message::CloseRequested),
        "q" | "quit" => Some(Message::BeforeQuit),
        "reload" => Some(Message::LoadUi),
        _ => {
            warn!("Unknown stdin command: {}", trimmed);
            None
        }
    }
}

fn spawn_stdin_reader_blocking(msg_tx: mpsc::Sender<Message>, prompt: PendingPrompt) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                if let Some(msg) = parse_command(&line, &prompt) {
                    info!("Stdin: {:?}", msg);
                    if msg_tx.blocking_send(msg).is_err() {
                        break;
                    }
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}
