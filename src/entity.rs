//! The persisted state unit.
//!
//! An [`Entity`] is what lives inside the shared file: the property map plus
//! the metadata of the data-level mutex. It is pure data; reading and writing
//! it is the job of [`crate::storage`].
//!
//! # Wire format
//!
//! A single JSON object with exactly four fields:
//!
//! ```json
//! {"data":{"hello":"world"},"locked":false,"timeout":0.0,"interval":50000}
//! ```
//!
//! Anything read from disk that does not match this shape field-by-field is
//! discarded and replaced by [`Entity::default`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property map shared between processes.
pub type Data = Map<String, Value>;

/// Smallest accepted polling interval, in microseconds.
pub const MIN_INTERVAL: u64 = 5_000;

/// Polling interval used when none was requested, in microseconds.
pub const DEFAULT_INTERVAL: u64 = 50_000;

/// Lock timeout meaning "wait forever".
pub const NO_TIMEOUT: f64 = 0.0;

/// The state stored in a shared file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entity {
    data: Data,
    locked: bool,
    timeout: f64,
    interval: u64,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            data: Data::new(),
            locked: false,
            timeout: NO_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Entity {
    /// Create an empty, unlocked entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an entity from its persisted bytes.
    ///
    /// Never fails: empty, malformed or out-of-range content yields the
    /// default entity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::default();
        }

        match serde_json::from_slice::<Entity>(bytes) {
            Ok(entity) if entity.is_valid() => entity,
            Ok(entity) => {
                log::warn!(
                    "discarding shared state with invalid lock metadata (timeout: {}, interval: {})",
                    entity.timeout,
                    entity.interval
                );
                Self::default()
            }
            Err(e) => {
                log::warn!("discarding unreadable shared state: {}", e);
                Self::default()
            }
        }
    }

    /// Encode the entity for persistence.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Check every invariant the persisted form must satisfy.
    pub fn is_valid(&self) -> bool {
        self.timeout.is_finite() && self.timeout >= 0.0 && self.interval >= MIN_INTERVAL
    }

    /// Restore the default state in place.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    pub fn into_data(self) -> Data {
        self.data
    }

    pub fn set_data(&mut self, data: Data) {
        self.data = data;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Lock timeout in seconds; `0` waits forever.
    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    /// Set the lock timeout. Negative or non-finite values are ignored.
    pub fn set_timeout(&mut self, timeout: f64) {
        if timeout.is_finite() && timeout >= 0.0 {
            self.timeout = timeout;
        }
    }

    /// Polling interval of waiters, in microseconds.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Set the polling interval. Values below [`MIN_INTERVAL`] are ignored.
    pub fn set_interval(&mut self, interval: u64) {
        if interval >= MIN_INTERVAL {
            self.interval = interval;
        }
    }
}
