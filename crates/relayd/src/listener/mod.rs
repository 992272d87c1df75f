//! Production listener for configured servers.
//!
//! Each server binds its listen address and forwards every accepted
//! connection to its upstream, applying the fixed socket timeouts.

mod errors;
mod forwarder;

pub use self::errors::ListenerError;

use relay_config::{ServerConfig, TimeoutPolicy};

use crate::runner::{Listener, ListenerFactory};

use self::forwarder::TcpForwarder;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listener");

/// Factory producing TCP forwarding listeners.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpForwarderFactory;

impl ListenerFactory for TcpForwarderFactory {
    fn bind(
        &self,
        server: ServerConfig,
        timeouts: TimeoutPolicy,
    ) -> Result<Box<dyn Listener>, ListenerError> {
        TcpForwarder::bind(server, timeouts).map(|listener| Box::new(listener) as Box<dyn Listener>)
    }
}
