//! Foreground multi-server runner.
//!
//! Each configured server gets its own named thread. The runner returns only
//! once every thread has signalled the shared [`CompletionBarrier`], whether
//! its listener finished cleanly, failed to bind, or panicked.

mod barrier;

use std::io;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{debug, error, info};

use relay_config::{ServerConfig, ServiceSet, TimeoutPolicy};

use crate::listener::ListenerError;

pub use barrier::{CompletionBarrier, CompletionToken};

pub(crate) const RUNNER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runner");

/// A bound listener ready to accept traffic.
pub trait Listener: Send {
    /// Serves until the listener stops accepting.
    fn serve(self: Box<Self>) -> Result<(), ListenerError>;
}

/// Builds a listener for one configured server.
pub trait ListenerFactory: Send + Sync {
    fn bind(
        &self,
        server: ServerConfig,
        timeouts: TimeoutPolicy,
    ) -> Result<Box<dyn Listener>, ListenerError>;
}

/// Errors raised while starting listener tasks.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The operating system refused to create a listener thread.
    #[error("failed to spawn listener thread for '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: io::Error,
    },
}

/// Runs one listener task per configured server and joins on all of them.
pub struct MultiServerRunner<F> {
    listeners: Arc<F>,
    timeouts: TimeoutPolicy,
}

impl<F> MultiServerRunner<F>
where
    F: ListenerFactory + 'static,
{
    pub fn new(listeners: Arc<F>) -> Self {
        Self {
            listeners,
            timeouts: TimeoutPolicy::default(),
        }
    }

    /// Uses `timeouts` for every listener instead of the fixed defaults.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_timeouts(mut self, timeouts: TimeoutPolicy) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Starts every server and blocks until all of their tasks have exited.
    ///
    /// Returns the number of tasks that were joined. A task that fails is
    /// logged and still counts towards completion; it never cancels its
    /// siblings.
    pub fn run(&self, services: &ServiceSet) -> Result<usize, RunnerError> {
        let barrier = CompletionBarrier::new();
        let mut started = 0;
        for (index, server) in services.servers().iter().enumerate() {
            let token = barrier.enter();
            self.spawn_task(index, server.clone(), token)?;
            started += 1;
        }
        debug!(
            target: RUNNER_TARGET,
            tasks = started,
            "waiting for listener tasks"
        );
        barrier.wait();
        Ok(started)
    }

    fn spawn_task(
        &self,
        index: usize,
        server: ServerConfig,
        token: CompletionToken,
    ) -> Result<(), RunnerError> {
        let label = server.label().to_owned();
        let factory = Arc::clone(&self.listeners);
        let timeouts = self.timeouts;
        thread::Builder::new()
            .name(format!("listener-{index}"))
            .spawn(move || {
                let _token = token;
                serve_one(factory.as_ref(), server, timeouts);
            })
            .map(drop)
            .map_err(|source| RunnerError::Spawn {
                server: label,
                source,
            })
    }
}

fn serve_one<F: ListenerFactory + ?Sized>(
    factory: &F,
    server: ServerConfig,
    timeouts: TimeoutPolicy,
) {
    let label = server.label().to_owned();
    let listener = match factory.bind(server, timeouts) {
        Ok(listener) => listener,
        Err(error) => {
            error!(
                target: RUNNER_TARGET,
                server = %label,
                error = %error,
                "listener failed to start"
            );
            return;
        }
    };
    info!(
        target: RUNNER_TARGET,
        server = %label,
        "listener started"
    );
    match listener.serve() {
        Ok(()) => info!(
            target: RUNNER_TARGET,
            server = %label,
            "listener exited"
        ),
        Err(error) => error!(
            target: RUNNER_TARGET,
            server = %label,
            error = %error,
            "listener failed"
        ),
    }
}
