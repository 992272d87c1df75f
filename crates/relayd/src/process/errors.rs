//! Defines the unified error surface for start, stop, and reload.

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use relay_config::ConfigError;

use super::launcher::SpawnError;
use crate::runner::RunnerError;

/// Errors surfaced by the daemon supervisor.
///
/// Every variant terminates the invocation that produced it; nothing in the
/// supervisor retries or recovers locally.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The server configuration failed to load.
    #[error("failed to load configuration: {source}")]
    ConfigLoad {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// The configuration path could not be made absolute.
    #[error("failed to resolve configuration path '{path}': {source}")]
    ResolveConfig {
        /// Path as supplied by the operator.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A PID record already exists, so a background instance is claimed.
    #[error("already running or pid file exists at '{path}'")]
    AlreadyRunning {
        /// PID file holding the existing claim.
        path: PathBuf,
    },
    /// No PID record exists.
    #[error("process is not running (no pid file at '{path}')")]
    NotRunning {
        /// Expected PID file location.
        path: PathBuf,
    },
    /// The PID record exists but could not be read.
    #[error("failed to read pid file '{path}': {source}")]
    PidRead {
        /// PID file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The PID record does not hold a usable process id.
    #[error("unable to parse pid file '{path}': {source}")]
    PidParse {
        /// PID file path.
        path: PathBuf,
        /// Reason the contents were rejected.
        #[source]
        source: PidFormatError,
    },
    /// No live process matches the recorded id.
    #[error("unable to find process {pid}: {source}")]
    PidLookup {
        /// Recorded process id.
        pid: u32,
        /// Underlying OS error.
        source: Errno,
    },
    /// The termination signal could not be delivered.
    #[error("unable to kill process {pid}: {source}")]
    Kill {
        /// Recorded process id.
        pid: u32,
        /// Underlying OS error.
        source: Errno,
    },
    /// The process was killed but its PID record could not be deleted.
    #[error("unable to remove pid file '{path}': {source}")]
    PidRemove {
        /// PID file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Persisting the PID record failed.
    #[error("failed to write pid file '{path}': {source}")]
    PidWrite {
        /// PID file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The detached child could not be started.
    #[error("failed to start background process: {source}")]
    Spawn {
        /// Underlying launcher error.
        #[from]
        source: SpawnError,
    },
    /// Listener tasks could not be launched.
    #[error("failed to launch listeners: {source}")]
    Runner {
        /// Underlying runner error.
        #[from]
        source: RunnerError,
    },
}

/// Reasons a PID record's contents are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PidFormatError {
    /// The contents are not a decimal integer.
    #[error("'{0}' is not a decimal process id")]
    NotNumeric(String),
    /// Zero addresses the caller's process group rather than one process.
    #[error("pid 0 does not identify a single process")]
    Zero,
    /// The value exceeds the platform's signed pid range.
    #[error("pid {0} exceeds the maximum process id")]
    OutOfRange(u64),
}

impl From<ConfigError> for SupervisorError {
    fn from(source: ConfigError) -> Self {
        Self::ConfigLoad { source }
    }
}
