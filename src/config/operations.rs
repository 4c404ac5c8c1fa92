//! Config loading, validation, and utility operations.

use super::model::{Config, DEFAULT_CONFIG_FILE};
use crate::entity::MIN_INTERVAL;
use crate::error::{Result, SharedError};
use crate::shared::SharedState;
use crate::storage::FileStorage;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SharedError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the config to use.
    ///
    /// An explicit path must exist. Without one, `.sharedfile.yaml` in `dir`
    /// is used when present, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("using config '{}'", candidate.display());
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| SharedError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SharedError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// - `lock_timeout` must be a finite number >= 0
    /// - `lock_interval` must be >= 5000
    /// - `read_chunk_size` must be positive
    pub fn validate(&self) -> Result<()> {
        if !self.lock_timeout.is_finite() || self.lock_timeout < 0.0 {
            return Err(SharedError::UserError(format!(
                "config validation failed: lock_timeout must be >= 0 (found {})",
                self.lock_timeout
            )));
        }

        if self.lock_interval < MIN_INTERVAL {
            return Err(SharedError::UserError(format!(
                "config validation failed: lock_interval must be >= {} (found {})",
                MIN_INTERVAL, self.lock_interval
            )));
        }

        if self.read_chunk_size == 0 {
            return Err(SharedError::UserError(
                "config validation failed: read_chunk_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Storage for the configured file.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.file).with_chunk_size(self.read_chunk_size)
    }

    /// Shared state over the configured file.
    pub fn shared_state(&self) -> SharedState {
        SharedState::new(self.storage())
    }
}
