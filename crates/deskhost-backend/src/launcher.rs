//! Candidate trial launcher
//!
//! Development mode walks an ordered list of interpreter candidates and keeps
//! the first one that spawns. Packaged mode has exactly one candidate and
//! reports its failure as-is.

use deskhost_core::prelude::*;

use crate::resolver::{ExecutableTarget, LaunchCommand};

/// A successfully spawned candidate
#[derive(Debug)]
pub struct Launched<T> {
    /// Whatever the spawn function produced (usually a `BackendProcess`)
    pub value: T,
    /// The command line that worked
    pub command: LaunchCommand,
    /// Zero-based index of the candidate that worked
    pub attempt: usize,
}

/// Where a trial run currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
enum Trial {
    /// Next candidate to try
    Next(usize),
    /// Every candidate failed
    Exhausted,
}

/// Launch `target` using `spawn` to start each candidate.
///
/// `spawn` is never called again once a candidate succeeds. Development
/// targets fail with [`Error::NoInterpreter`] when every interpreter fails;
/// packaged targets surface the spawn error untouched.
pub fn launch<T, F>(target: &ExecutableTarget, spawn: F) -> Result<Launched<T>>
where
    F: FnMut(&LaunchCommand) -> Result<T>,
{
    let candidates = target.candidates();
    match target {
        ExecutableTarget::Development { interpreters, .. } => {
            launch_first(&candidates, spawn).map_err(|e| {
                error!("Could not start development backend: {}", e);
                Error::NoInterpreter {
                    tried: interpreters.clone(),
                }
            })
        }
        ExecutableTarget::Packaged { .. } => launch_single(&candidates, spawn),
    }
}

/// Try each candidate in order, stopping at the first that spawns.
///
/// Returns the last spawn error if all candidates fail.
pub fn launch_first<T, F>(candidates: &[LaunchCommand], mut spawn: F) -> Result<Launched<T>>
where
    F: FnMut(&LaunchCommand) -> Result<T>,
{
    let mut trial = Trial::Next(0);
    let mut last_error = None;

    loop {
        trial = match trial {
            Trial::Next(index) if index >= candidates.len() => Trial::Exhausted,
            Trial::Next(index) => {
                let command = &candidates[index];
                log_resolution(command);
                info!("Starting backend: {}", command);
                match spawn(command) {
                    Ok(value) => {
                        info!("Backend started using {}", command.program_name());
                        return Ok(Launched {
                            value,
                            command: command.clone(),
                            attempt: index,
                        });
                    }
                    Err(e) => {
                        warn!("Failed to start with {}: {}", command.program_name(), e);
                        last_error = Some(e);
                        Trial::Next(index + 1)
                    }
                }
            }
            Trial::Exhausted => {
                return Err(last_error
                    .unwrap_or_else(|| Error::process("no backend launch candidates")));
            }
        };
    }
}

fn launch_single<T, F>(candidates: &[LaunchCommand], mut spawn: F) -> Result<Launched<T>>
where
    F: FnMut(&LaunchCommand) -> Result<T>,
{
    let Some(command) = candidates.first() else {
        return Err(Error::process("no backend launch candidates"));
    };

    info!("Starting packaged backend: {}", command);
    let value = spawn(command).inspect_err(|e| error!("Packaged backend failed to start: {}", e))?;
    Ok(Launched {
        value,
        command: command.clone(),
        attempt: 0,
    })
}

fn log_resolution(command: &LaunchCommand) {
    match which::which(&command.program) {
        Ok(path) => debug!("{} resolves to {}", command.program_name(), path.display()),
        Err(_) => debug!("{} not found on PATH", command.program_name()),
    }
}
