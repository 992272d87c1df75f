//! Test harness utilities shared by the supervisor suites.

mod launcher;
mod loader;
mod listeners;

use std::path::Path;
use std::process::Command;

use relay_config::RuntimePaths;

use crate::context::RuntimeContext;
use crate::telemetry::TelemetryHandle;

pub use launcher::SleepLauncher;
pub use listeners::InstantListenerFactory;
pub use loader::StaticConfigLoader;

/// Context rooted in `dir` with telemetry disabled.
pub fn context_in(dir: &Path) -> RuntimeContext {
    RuntimeContext::new(
        RuntimePaths::in_directory(dir.join(".relayd")),
        TelemetryHandle::disabled(),
    )
}

/// Pid of a process that has already exited and been reaped.
pub fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().expect("spawn short-lived child");
    let pid = child.id();
    child.wait().expect("reap short-lived child");
    pid
}
