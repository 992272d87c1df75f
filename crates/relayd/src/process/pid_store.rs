//! Single-slot durable record of the background process id.
//!
//! The record is a claim, not a proof: callers must probe the process before
//! acting on it. No locking is performed, so a check-then-write sequence from
//! two concurrent invocations can race, and a failed write leaves whatever
//! process the caller just spawned without a record.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::info;

use relay_config::RuntimePaths;

use super::PROCESS_TARGET;
use super::errors::{PidFormatError, SupervisorError};

/// PID file at a fixed location under the runtime directory.
#[derive(Debug, Clone)]
pub struct PidStore {
    path: PathBuf,
}

impl PidStore {
    /// Builds a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Builds the store at the runtime layout's PID path.
    pub fn at(paths: &RuntimePaths) -> Self {
        Self::new(paths.pid_path())
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Creates or overwrites the record with the decimal form of `pid`.
    pub fn write(&self, pid: u32) -> Result<(), SupervisorError> {
        self.persist(pid)
            .map_err(|source| SupervisorError::PidWrite {
                path: self.path.clone(),
                source,
            })?;
        info!(
            target: PROCESS_TARGET,
            pid,
            file = %self.path.display(),
            "pid file written"
        );
        Ok(())
    }

    /// Reads and validates the recorded process id.
    pub fn read(&self) -> Result<u32, SupervisorError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(SupervisorError::NotRunning {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(SupervisorError::PidRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        parse_pid(&content).map_err(|source| SupervisorError::PidParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Stages the record next to its final path and renames it into place,
    /// so a concurrent reader sees either the old pid or the new one.
    fn persist(&self, pid: u32) -> io::Result<()> {
        let directory = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(directory)?;
        let mut staged = tempfile::Builder::new()
            .prefix(".pid-")
            .permissions(Permissions::from_mode(0o600))
            .tempfile_in(directory)?;
        write!(staged, "{pid}")?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map(drop)
            .map_err(|error| error.error)
    }

    /// Deletes the record. A missing file is reported as an error.
    pub fn remove(&self) -> Result<(), SupervisorError> {
        fs::remove_file(&self.path).map_err(|source| SupervisorError::PidRemove {
            path: self.path.clone(),
            source,
        })?;
        info!(
            target: PROCESS_TARGET,
            file = %self.path.display(),
            "pid file removed"
        );
        Ok(())
    }
}

fn parse_pid(content: &str) -> Result<u32, PidFormatError> {
    let trimmed = content.trim();
    let value = trimmed
        .parse::<u64>()
        .map_err(|_| PidFormatError::NotNumeric(trimmed.to_string()))?;
    if value == 0 {
        return Err(PidFormatError::Zero);
    }
    if value > i32::MAX as u64 {
        return Err(PidFormatError::OutOfRange(value));
    }
    Ok(value as u32)
}
