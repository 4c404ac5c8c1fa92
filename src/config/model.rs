//! Config struct definition and default implementation.

use crate::entity::{DEFAULT_INTERVAL, NO_TIMEOUT};
use crate::storage::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".sharedfile.yaml";

/// Configuration for the sharedfile CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared state file (default: `<tmp>/sharedfile.sync`).
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// Seconds other processes wait on a held mutex before failing (0 = forever).
    #[serde(default)]
    pub lock_timeout: f64,

    /// Microseconds between two checks of a held mutex.
    #[serde(default = "default_lock_interval")]
    pub lock_interval: u64,

    /// Block size used when reading the state file.
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            lock_timeout: NO_TIMEOUT,
            lock_interval: default_lock_interval(),
            read_chunk_size: default_read_chunk_size(),
        }
    }
}

fn default_file() -> PathBuf {
    std::env::temp_dir().join("sharedfile.sync")
}

fn default_lock_interval() -> u64 {
    DEFAULT_INTERVAL
}

fn default_read_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
