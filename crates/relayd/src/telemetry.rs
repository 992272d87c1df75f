//! Structured telemetry initialisation for `relayd`.
//!
//! Every invocation (foreground, detached child, or control command) appends
//! to the same log file under the runtime directory.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use relay_config::LogFormat;

static TELEMETRY_GUARD: OnceCell<PathBuf> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone)]
pub struct TelemetryHandle {
    log_path: Option<PathBuf>,
}

impl TelemetryHandle {
    /// Handle for an invocation that runs without a log sink.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// File receiving log events, when telemetry is active.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }
}

/// Logging options taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySettings<'a> {
    pub log_path: &'a Path,
    pub filter: &'a str,
    pub format: LogFormat,
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The log file could not be opened for appending.
    #[error("failed to open log file '{path}': {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and later calls return a handle for the first log file.
pub fn initialise(settings: TelemetrySettings<'_>) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(settings))
        .map(|path| TelemetryHandle {
            log_path: Some(path.clone()),
        })
}

fn install_subscriber(settings: TelemetrySettings<'_>) -> Result<PathBuf, TelemetryError> {
    let filter = EnvFilter::try_new(settings.filter)
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let file = open_log_file(settings.log_path)?;

    let builder = |filter: EnvFilter, file: File| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match settings.format {
        LogFormat::Json => Box::new(builder(filter, file).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter, file).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    Ok(settings.log_path.to_path_buf())
}

fn open_log_file(path: &Path) -> Result<File, TelemetryError> {
    let log_error = |source| TelemetryError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(log_error)?;
    }
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path).map_err(log_error)
}
