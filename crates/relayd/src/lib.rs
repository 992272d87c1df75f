//! Process supervisor for the relay service.
//!
//! `relayd` runs its configured TCP listeners either in the foreground or as
//! a detached background process. The background process is tracked through
//! a single PID file under `$HOME/.relayd`; `stop` kills the recorded process
//! outright and `reload` is a stop followed by a fresh background start.
//!
//! The entry point is [`run`], which parses arguments, initialises telemetry,
//! and dispatches to the [`process::Supervisor`]. Tests substitute the
//! supervisor's collaborators through the traits in [`process`],
//! [`config_loader`], and [`runner`].

mod cli;
pub mod config_loader;
pub mod context;
pub mod listener;
pub mod process;
pub mod runner;
pub mod telemetry;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing::error;

use relay_config::{RuntimePaths, RuntimePathsError};

use crate::cli::{Cli, CliCommand};
use crate::config_loader::JsonConfigLoader;
use crate::context::RuntimeContext;
use crate::listener::TcpForwarderFactory;
use crate::process::{
    LaunchMode, ProcessControl, ReexecLauncher, ServiceDeps, SignalTerminator, StartOutcome,
    Supervisor, SupervisorError,
};
use crate::telemetry::{TelemetryHandle, TelemetrySettings};

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cli");

/// Errors that end an invocation with a failure exit code.
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Paths(#[from] RuntimePathsError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Parses `args`, performs the requested lifecycle command, and reports the
/// outcome on `stdout` or `stderr`.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let rendered = error.render();
            let _ = if error.use_stderr() {
                write!(stderr, "{rendered}")
            } else {
                write!(stdout, "{rendered}")
            };
            return exit_code(error.exit_code());
        }
    };

    match execute(&cli, stdout, stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(app_error) => {
            error!(
                target: CLI_TARGET,
                error = %app_error,
                "command failed"
            );
            let _ = writeln!(stderr, "relayd: {app_error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, E: Write>(cli: &Cli, stdout: &mut W, stderr: &mut E) -> Result<(), AppError> {
    let paths = RuntimePaths::from_env()?;
    let telemetry = telemetry::initialise(TelemetrySettings {
        log_path: paths.log_path(),
        filter: &cli.log_filter,
        format: cli.log_format,
    })
    .unwrap_or_else(|telemetry_error| {
        let _ = writeln!(stderr, "relayd: logging disabled: {telemetry_error}");
        TelemetryHandle::disabled()
    });

    let supervisor = Supervisor::new(
        RuntimeContext::new(paths, telemetry),
        ProcessControl {
            launcher: ReexecLauncher::current_executable().forwarding(cli.forwarded_arguments()),
            terminator: SignalTerminator,
        },
        ServiceDeps {
            loader: JsonConfigLoader,
            listeners: Arc::new(TcpForwarderFactory),
        },
    );

    match &cli.command {
        CliCommand::Run { config, daemon } => {
            let mode = if *daemon {
                LaunchMode::Background
            } else {
                LaunchMode::Foreground
            };
            match supervisor.start(config.as_deref(), mode)? {
                StartOutcome::Detached { pid } => {
                    let _ = writeln!(stdout, "relayd started in background (pid {pid})");
                }
                StartOutcome::Completed { listeners } => {
                    let _ = writeln!(stdout, "relayd exited after {listeners} listener(s) stopped");
                }
            }
        }
        CliCommand::Stop => {
            let pid = supervisor.stop()?;
            let _ = writeln!(stdout, "relayd stopped (pid {pid})");
        }
        CliCommand::Reload { config } => {
            let outcome = supervisor.reload(config.as_deref())?;
            let _ = writeln!(
                stdout,
                "relayd reloaded (stopped pid {}, started pid {})",
                outcome.stopped, outcome.started
            );
        }
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
