//! Orchestrates start, stop, and reload of the relay service.
//!
//! Lifecycle state is never persisted beyond the PID record. A service is
//! considered running while the record exists; `stop` verifies that claim by
//! probing the recorded process before killing it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config_loader::ConfigLoader;
use crate::context::RuntimeContext;
use crate::runner::{ListenerFactory, MultiServerRunner};

use super::PROCESS_TARGET;
use super::errors::SupervisorError;
use super::launcher::ProcessLauncher;
use super::pid_store::PidStore;
use super::terminator::ProcessTerminator;

/// Launch mode for `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Spawn a detached child and return once its pid is recorded.
    Background,
    /// Serve from the calling process until it is terminated.
    Foreground,
}

/// Result of a successful `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A background child was spawned and recorded.
    Detached { pid: u32 },
    /// Every foreground listener task has exited.
    Completed { listeners: usize },
}

/// Pids involved in a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub stopped: u32,
    pub started: u32,
}

/// Process-level collaborators used to control the background instance.
pub struct ProcessControl<L, T> {
    pub launcher: L,
    pub terminator: T,
}

/// Service dependencies used by the foreground instance.
pub struct ServiceDeps<C, F> {
    pub loader: C,
    pub listeners: Arc<F>,
}

/// Implements start / stop / reload over the PID store.
pub struct Supervisor<C, F, L, T> {
    context: RuntimeContext,
    store: PidStore,
    process: ProcessControl<L, T>,
    services: ServiceDeps<C, F>,
}

impl<C, F, L, T> Supervisor<C, F, L, T>
where
    C: ConfigLoader,
    F: ListenerFactory + 'static,
    L: ProcessLauncher,
    T: ProcessTerminator,
{
    pub fn new(
        context: RuntimeContext,
        process: ProcessControl<L, T>,
        services: ServiceDeps<C, F>,
    ) -> Self {
        let store = PidStore::at(context.paths());
        Self {
            context,
            store,
            process,
            services,
        }
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    pub fn pid_store(&self) -> &PidStore {
        &self.store
    }

    /// Starts the service.
    ///
    /// In foreground mode this blocks until every listener task has exited.
    /// In background mode it refuses to run when a PID record exists, and
    /// otherwise returns as soon as the child's pid is recorded. The existence
    /// check and the later write are not atomic, so two concurrent starts can
    /// both pass the check. If recording fails after the child was spawned,
    /// the child keeps running without a record: `stop` cannot find it and a
    /// later background start launches a second instance. The child is not
    /// killed here; the operator has to terminate it by hand.
    pub fn start(
        &self,
        config: Option<&Path>,
        mode: LaunchMode,
    ) -> Result<StartOutcome, SupervisorError> {
        info!(
            target: PROCESS_TARGET,
            ?mode,
            log = ?self.context.telemetry().log_path(),
            "starting relay service"
        );
        match mode {
            LaunchMode::Foreground => self.run_foreground(config),
            LaunchMode::Background => self
                .spawn_background(config)
                .map(|pid| StartOutcome::Detached { pid }),
        }
    }

    /// Kills the recorded background process and deletes its record.
    ///
    /// Any failure before the final delete leaves the record untouched.
    pub fn stop(&self) -> Result<u32, SupervisorError> {
        let pid = self.store.read()?;
        self.process
            .terminator
            .probe(pid)
            .map_err(|source| SupervisorError::PidLookup { pid, source })?;
        self.process
            .terminator
            .kill(pid)
            .map_err(|source| SupervisorError::Kill { pid, source })?;
        self.store.remove()?;
        info!(
            target: PROCESS_TARGET,
            pid,
            "background process stopped"
        );
        Ok(pid)
    }

    /// Stops the background process, then starts a new one.
    ///
    /// A failed stop aborts before anything is spawned. A failed start after
    /// a successful stop is not rolled back and leaves the service stopped.
    pub fn reload(&self, config: Option<&Path>) -> Result<ReloadOutcome, SupervisorError> {
        let stopped = self.stop()?;
        let started = self.spawn_background(config).inspect_err(|error| {
            warn!(
                target: PROCESS_TARGET,
                stopped,
                error = %error,
                "restart failed after stop; service left stopped"
            );
        })?;
        Ok(ReloadOutcome { stopped, started })
    }

    fn run_foreground(&self, config: Option<&Path>) -> Result<StartOutcome, SupervisorError> {
        let config_path = self.resolve_config(config)?;
        let services = self.services.loader.load(&config_path)?;
        info!(
            target: PROCESS_TARGET,
            servers = services.len(),
            config = %config_path.display(),
            pid = std::process::id(),
            "configuration loaded; serving in foreground"
        );
        let runner = MultiServerRunner::new(Arc::clone(&self.services.listeners));
        let listeners = runner.run(&services)?;
        info!(
            target: PROCESS_TARGET,
            listeners,
            "all listener tasks exited"
        );
        Ok(StartOutcome::Completed { listeners })
    }

    fn spawn_background(&self, config: Option<&Path>) -> Result<u32, SupervisorError> {
        if self.store.exists() {
            warn!(
                target: PROCESS_TARGET,
                file = %self.store.path().display(),
                "refusing to start: pid file already exists"
            );
            return Err(SupervisorError::AlreadyRunning {
                path: self.store.path().to_path_buf(),
            });
        }
        let config_path = self.resolve_config(config)?;
        // Surface configuration errors to the operator instead of inside the
        // detached child, whose output is discarded.
        self.services.loader.load(&config_path)?;
        let pid = self.process.launcher.launch(&config_path)?;
        self.store.write(pid)?;
        info!(
            target: PROCESS_TARGET,
            pid,
            "background process successfully started"
        );
        Ok(pid)
    }

    fn resolve_config(&self, config: Option<&Path>) -> Result<PathBuf, SupervisorError> {
        let path = config.unwrap_or_else(|| self.context.paths().default_config_path());
        std::path::absolute(path).map_err(|source| SupervisorError::ResolveConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}
