//! Daemon process supervision: PID records, detached launch, and kill-based stop.

mod errors;
mod launcher;
mod pid_store;
mod supervisor;
mod terminator;

pub use errors::{PidFormatError, SupervisorError};
pub use launcher::{ProcessLauncher, ReexecLauncher, SpawnError};
pub use pid_store::PidStore;
pub use supervisor::{
    LaunchMode, ProcessControl, ReloadOutcome, ServiceDeps, StartOutcome, Supervisor,
};
pub use terminator::{ProcessTerminator, SignalTerminator};

#[cfg(test)]
pub(crate) use launcher::MockProcessLauncher;
#[cfg(test)]
pub(crate) use terminator::MockProcessTerminator;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
