//! Derives runtime artefact paths shared by every `relayd` invocation.
//!
//! The runtime directory lives under the operator's home directory and holds
//! the PID record, the append-only log, and the default server configuration.
//! Foreground, background, and control invocations must agree on this layout
//! so `stop` and `reload` can find the record written by `run --daemon`.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::defaults::{CONFIG_FILE_NAME, LOG_FILE_NAME, PID_FILE_NAME, RUNTIME_DIR_NAME};

/// Environment variable consulted for the home directory.
pub const HOME_ENV_VAR: &str = "HOME";

/// Canonical paths for runtime artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    runtime_dir: PathBuf,
    pid_path: PathBuf,
    log_path: PathBuf,
    config_path: PathBuf,
}

impl RuntimePaths {
    /// Derives runtime paths from the `HOME` environment variable, falling
    /// back to the platform home directory lookup.
    pub fn from_env() -> Result<Self, RuntimePathsError> {
        Self::from_home_var(env::var_os(HOME_ENV_VAR))
    }

    fn from_home_var(home: Option<OsString>) -> Result<Self, RuntimePathsError> {
        let home = home
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or(RuntimePathsError::MissingHome)?;
        Ok(Self::under_home(&home))
    }

    /// Derives runtime paths below an explicit home directory.
    pub fn under_home(home: &Path) -> Self {
        Self::in_directory(home.join(RUNTIME_DIR_NAME))
    }

    /// Uses `runtime_dir` directly as the artefact directory.
    pub fn in_directory(runtime_dir: impl Into<PathBuf>) -> Self {
        let runtime_dir = runtime_dir.into();
        Self {
            pid_path: runtime_dir.join(PID_FILE_NAME),
            log_path: runtime_dir.join(LOG_FILE_NAME),
            config_path: runtime_dir.join(CONFIG_FILE_NAME),
            runtime_dir,
        }
    }

    /// Directory holding runtime artefacts.
    pub fn runtime_dir(&self) -> &Path {
        self.runtime_dir.as_path()
    }

    /// Path to the PID file.
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Path to the append-only log file.
    pub fn log_path(&self) -> &Path {
        self.log_path.as_path()
    }

    /// Server configuration used when no explicit path is supplied.
    pub fn default_config_path(&self) -> &Path {
        self.config_path.as_path()
    }
}

/// Errors raised while deriving runtime paths.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// Neither `HOME` nor the platform lookup produced a home directory.
    #[error("unable to determine the home directory; set HOME")]
    MissingHome,
}
