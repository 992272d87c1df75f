//! Server entries loaded from the JSON configuration file.
//!
//! The lifecycle manager only reads the listen address and grace period from
//! each entry. The remaining fields belong to the listener that serves the
//! entry and are carried through untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::defaults::{DEFAULT_GRACE_TIMEOUT, IDLE_TIMEOUT, READ_TIMEOUT, WRITE_TIMEOUT};

/// One listener entry in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Optional label used in logs and thread names.
    #[serde(default)]
    pub name: Option<String>,
    /// Address to bind, either `host:port` or `:port` for all interfaces.
    pub listen: String,
    /// Address that accepted connections are forwarded to.
    pub upstream: String,
    /// Grace period for in-flight connections, in whole seconds.
    #[serde(default = "default_grace_timeout", deserialize_with = "whole_seconds")]
    pub grace_timeout: Duration,
}

impl ServerConfig {
    /// Returns the bind address with a bare `:port` expanded to all interfaces.
    pub fn listen_address(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }

    /// Label for logs: the configured name or the listen address.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.listen)
    }
}

fn default_grace_timeout() -> Duration {
    DEFAULT_GRACE_TIMEOUT
}

fn whole_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// Ordered, immutable collection of server entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceSet {
    servers: Vec<ServerConfig>,
}

impl ServiceSet {
    /// Builds a set from already parsed entries.
    pub fn new(servers: Vec<ServerConfig>) -> Self {
        Self { servers }
    }

    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set: Self = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if set.servers.is_empty() {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(set)
    }

    /// Entries in file order.
    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Fixed socket timeouts applied by every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub read: Duration,
    pub write: Duration,
    pub idle: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            read: READ_TIMEOUT,
            write: WRITE_TIMEOUT,
            idle: IDLE_TIMEOUT,
        }
    }
}

/// Errors raised while loading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration '{path}' does not define any servers")]
    Empty { path: PathBuf },
}
