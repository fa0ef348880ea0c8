//! Events emitted by a supervised backend process

/// Events from the backend child process
///
/// A process emits any number of `Stdout`/`Stderr` lines followed by exactly
/// one terminal event: `Exited` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Raw stdout line
    Stdout(String),

    /// Raw stderr line
    Stderr(String),

    /// Backend process has exited
    Exited {
        code: Option<i32>,
        /// Terminating signal on Unix, `None` elsewhere
        signal: Option<i32>,
    },

    /// Waiting on the backend process failed; it is no longer tracked
    Failed { reason: String },
}

impl BackendEvent {
    /// Whether this event ends the process lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, BackendEvent::Exited { .. } | BackendEvent::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(BackendEvent::Exited {
            code: Some(0),
            signal: None
        }
        .is_terminal());
        assert!(BackendEvent::Failed {
            reason: "wait failed".to_string()
        }
        .is_terminal());
        assert!(!BackendEvent::Stdout("INFO: started".to_string()).is_terminal());
        assert!(!BackendEvent::Stderr("warning".to_string()).is_terminal());
    }
}
