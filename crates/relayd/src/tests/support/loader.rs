//! Configuration loaders returning canned server sets.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relay_config::{ConfigError, ServerConfig, ServiceSet};

use crate::config_loader::ConfigLoader;

/// Loader that records requested paths and returns a fixed server set, or
/// reports every path as missing when built with [`StaticConfigLoader::missing`].
///
/// Clones share the request log.
#[derive(Clone)]
pub struct StaticConfigLoader {
    services: Option<ServiceSet>,
    requested: Arc<Mutex<Vec<PathBuf>>>,
}

impl StaticConfigLoader {
    pub fn with_listens(listens: &[&str]) -> Self {
        let servers = listens
            .iter()
            .map(|listen| ServerConfig {
                name: None,
                listen: (*listen).to_owned(),
                upstream: "127.0.0.1:9".to_owned(),
                grace_timeout: Duration::from_secs(5),
            })
            .collect();
        Self {
            services: Some(ServiceSet::new(servers)),
            requested: Arc::default(),
        }
    }

    pub fn missing() -> Self {
        Self {
            services: None,
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<PathBuf> {
        self.requested.lock().expect("requested lock").clone()
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, path: &Path) -> Result<ServiceSet, ConfigError> {
        self.requested
            .lock()
            .expect("requested lock")
            .push(path.to_path_buf());
        self.services.clone().ok_or_else(|| ConfigError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}
