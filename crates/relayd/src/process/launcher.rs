//! Spawns the detached background instance.
//!
//! The child re-invokes this program as `run --config <ABS>` with the config
//! path resolved by the parent, so the child's working directory cannot change
//! the meaning of a relative path.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over strategies for starting the background instance.
///
/// Platforms without fork/exec parity can register with a service manager
/// instead, as long as the id of the started process is returned.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessLauncher: Send + Sync {
    /// Starts a detached instance serving `config_path` and returns its pid.
    fn launch(&self, config_path: &Path) -> Result<u32, SpawnError>;
}

/// Failure to start the detached child.
#[derive(Debug, Error)]
#[error("unable to start process {program:?}: {source}")]
pub struct SpawnError {
    /// Program that failed to start.
    pub program: OsString,
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone)]
enum Program {
    CurrentExecutable,
    Explicit(OsString),
}

/// Launcher that re-executes a program in foreground mode.
#[derive(Debug, Clone)]
pub struct ReexecLauncher {
    program: Program,
    forwarded: Vec<OsString>,
}

impl ReexecLauncher {
    /// Re-executes the running binary.
    pub fn current_executable() -> Self {
        Self {
            program: Program::CurrentExecutable,
            forwarded: Vec::new(),
        }
    }

    /// Re-executes `program` instead of the running binary.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: Program::Explicit(program.into()),
            forwarded: Vec::new(),
        }
    }

    /// Global arguments placed ahead of the `run` subcommand.
    #[must_use]
    pub fn forwarding<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.forwarded = arguments
            .into_iter()
            .map(|argument| argument.as_ref().to_os_string())
            .collect();
        self
    }

    fn resolve_program(&self) -> Result<OsString, SpawnError> {
        match &self.program {
            Program::Explicit(program) => Ok(program.clone()),
            Program::CurrentExecutable => env::current_exe()
                .map(OsString::from)
                .map_err(|source| SpawnError {
                    program: OsString::from(env!("CARGO_PKG_NAME")),
                    source,
                }),
        }
    }

    fn command(&self, program: &OsStr, config_path: &Path) -> Command {
        let mut command = Command::new(program);
        command
            .args(&self.forwarded)
            .arg("run")
            .arg("--config")
            .arg(config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: terminal signals aimed at the parent's group
            // must not reach the daemon.
            command.process_group(0);
        }
        command
    }
}

impl ProcessLauncher for ReexecLauncher {
    fn launch(&self, config_path: &Path) -> Result<u32, SpawnError> {
        let program = self.resolve_program()?;
        let child = self
            .command(&program, config_path)
            .spawn()
            .map_err(|source| SpawnError {
                program: program.clone(),
                source,
            })?;
        let pid = child.id();
        info!(
            target: PROCESS_TARGET,
            pid,
            program = %program.to_string_lossy(),
            config = %config_path.display(),
            "background process spawned"
        );
        // Dropping the handle neither waits for nor kills the child.
        drop(child);
        Ok(pid)
    }
}
