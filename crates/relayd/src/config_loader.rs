//! Server configuration loading seam.

use std::path::Path;

use relay_config::{ConfigError, ServiceSet};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server entries stored at `path`.
    fn load(&self, path: &Path) -> Result<ServiceSet, ConfigError>;
}

/// Loader that reads the JSON file from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigLoader;

impl ConfigLoader for JsonConfigLoader {
    fn load(&self, path: &Path) -> Result<ServiceSet, ConfigError> {
        ServiceSet::load(path)
    }
}
