//! Listener factories whose tasks finish immediately.

use std::sync::Mutex;

use relay_config::{ServerConfig, TimeoutPolicy};

use crate::listener::ListenerError;
use crate::runner::{Listener, ListenerFactory};

struct InstantListener;

impl Listener for InstantListener {
    fn serve(self: Box<Self>) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Factory recording each bound listen address.
#[derive(Default)]
pub struct InstantListenerFactory {
    bound: Mutex<Vec<String>>,
}

impl InstantListenerFactory {
    pub fn bound(&self) -> Vec<String> {
        let mut bound = self.bound.lock().expect("bound lock").clone();
        bound.sort();
        bound
    }
}

impl ListenerFactory for InstantListenerFactory {
    fn bind(
        &self,
        server: ServerConfig,
        _timeouts: TimeoutPolicy,
    ) -> Result<Box<dyn Listener>, ListenerError> {
        self.bound.lock().expect("bound lock").push(server.listen);
        Ok(Box::new(InstantListener))
    }
}
