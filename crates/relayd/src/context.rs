//! Explicit runtime context built once at program entry.

use relay_config::RuntimePaths;

use crate::telemetry::TelemetryHandle;

/// Resolved paths and the logging handle shared by every supervisor operation.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    paths: RuntimePaths,
    telemetry: TelemetryHandle,
}

impl RuntimeContext {
    pub fn new(paths: RuntimePaths, telemetry: TelemetryHandle) -> Self {
        Self { paths, telemetry }
    }

    pub fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    pub fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }
}
