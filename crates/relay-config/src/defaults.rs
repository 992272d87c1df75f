//! Fixed names, durations, and filters shared by every invocation.

use std::time::Duration;

/// Directory created under the home directory for runtime artefacts.
pub const RUNTIME_DIR_NAME: &str = ".relayd";

/// File name of the single-slot PID record.
pub const PID_FILE_NAME: &str = "pid";

/// File name of the append-only log.
pub const LOG_FILE_NAME: &str = "relayd.log";

/// File name of the server configuration used when `--config` is omitted.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "debug";

/// Grace period applied when a server entry omits `grace_timeout`.
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time spent waiting for a client read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time spent waiting for a write to complete.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum time an upstream connection may sit without traffic.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);
