//! Test utilities for backend supervision
//!
//! Provides a scripted [`ShutdownRequest`], detached processes driven by an
//! [`ExitWatch`], and a one-shot HTTP responder.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use deskhost_core::prelude::*;

use crate::client::ShutdownRequest;
use crate::process::{BackendProcess, ExitWatch};
use crate::resolver::LaunchCommand;

/// How a [`FakeShutdown`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownBehavior {
    /// Request delivered
    Accept,
    /// Connection refused
    Refuse,
    /// Never answers
    Hang,
}

/// Scripted shutdown endpoint that counts its calls
#[derive(Debug, Clone)]
pub struct FakeShutdown {
    behavior: ShutdownBehavior,
    calls: Arc<AtomicUsize>,
    exit: Option<(ExitWatch, Duration)>,
}

impl FakeShutdown {
    pub fn new(behavior: ShutdownBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            exit: None,
        }
    }

    /// Make the "backend" exit `after` the request arrives
    pub fn exiting(mut self, watch: ExitWatch, after: Duration) -> Self {
        self.exit = Some((watch, after));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ShutdownRequest for FakeShutdown {
    async fn request_shutdown(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((watch, after)) = &self.exit {
            tokio::time::sleep(*after).await;
            watch.mark_exited();
        }

        match self.behavior {
            ShutdownBehavior::Accept => Ok(()),
            ShutdownBehavior::Refuse => Err(Error::http("connection refused")),
            ShutdownBehavior::Hang => std::future::pending::<Result<()>>().await,
        }
    }
}

/// A process with the given pid whose exit is controlled by the returned watch
pub fn detached_process(pid: u32) -> (BackendProcess, ExitWatch) {
    let watch = ExitWatch::new(Some(pid));
    let command = LaunchCommand {
        program: PathBuf::from("python"),
        args: vec!["python-yt-dl/main.py".to_string()],
    };
    (BackendProcess::from_watch(command, watch.clone()), watch)
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
///
/// Returns the base URL to point a client at and a handle resolving to the
/// raw request text.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept test connection");
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason_phrase(status),
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let body_len = content_length(&text[..header_end]);
            if buf.len() >= header_end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn content_length(headers: &str) -> usize {
    headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_header() {
        assert_eq!(
            content_length("POST /api/user HTTP/1.1\r\nContent-Length: 42\r\nHost: x"),
            42
        );
        assert_eq!(content_length("GET / HTTP/1.1\r\nHost: x"), 0);
    }

    #[tokio::test]
    async fn test_detached_process_follows_watch() {
        let (process, watch) = detached_process(1234);
        assert_eq!(process.id(), Some(1234));
        assert!(process.is_running());

        watch.mark_exited();
        assert!(process.has_exited());
    }
}
