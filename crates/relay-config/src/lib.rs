//! Shared configuration for the `relayd` supervisor.
//!
//! The crate owns the JSON server schema consumed by the foreground runner,
//! the runtime artefact layout under the operator's home directory, and the
//! defaults both the supervisor and its detached children agree on.

pub mod defaults;
mod logging;
mod runtime;
mod server;

pub use defaults::DEFAULT_LOG_FILTER;
pub use logging::LogFormat;
pub use runtime::{HOME_ENV_VAR, RuntimePaths, RuntimePathsError};
pub use server::{ConfigError, ServerConfig, ServiceSet, TimeoutPolicy};
