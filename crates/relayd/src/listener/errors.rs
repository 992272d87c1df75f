//! Error types for the TCP forwarder.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running a forwarding listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to resolve address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("no socket addresses resolved for {address}")]
    ResolveEmpty { address: String },
    #[error("failed to bind listener at {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    pub(crate) fn bind(addr: SocketAddr, source: io::Error) -> Self {
        Self::Bind {
            address: addr.to_string(),
            source,
        }
    }
}
