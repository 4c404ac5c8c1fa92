//! Process-shared key/value state.
//!
//! [`SharedState`] is the public face of the crate. Each operation reads a
//! fresh snapshot from storage, applies its change and persists the whole
//! snapshot back; nothing is cached between calls.
//!
//! # Two levels of locking
//!
//! - The **advisory file lock** (see [`crate::storage`]) makes a single
//!   operation atomic. It is taken on open and released on close.
//! - The **data-level mutex** (`lock`/`unlock`) spans several operations. It
//!   is a flag inside the stored entity: while set, every other instance waits
//!   in a polling loop until it clears or the holder's timeout elapses.
//!
//! If a process dies between `lock` and `unlock`, the flag stays set. Waiters
//! then fail after the stored timeout, or wait forever when it is `0`. Any
//! instance may call `unlock` to clear it.
//!
//! # Example
//!
//! ```no_run
//! use sharedfile::SharedState;
//! use serde_json::json;
//!
//! let mut shared = SharedState::open("/tmp/demo.sync");
//! shared.set("hello", json!("world"))?;
//! assert_eq!(shared.get("hello")?, Some(json!("world")));
//!
//! shared.lock(10.0, 50_000)?;
//! let count = shared.get_or("count", json!(0))?.as_i64().unwrap_or(0);
//! shared.set("count", json!(count + 1))?;
//! shared.unlock()?;
//! # Ok::<(), sharedfile::SharedError>(())
//! ```

mod retrieval;


use crate::entity::{Data, Entity, MIN_INTERVAL};
use crate::error::{Result, SharedError};
use crate::storage::{Access, FileStorage, Storage};
use serde_json::Value;
use std::path::Path;

/// A handle on state shared between processes through a storage.
///
/// The "holding the mutex" flag is per instance: a second instance in the
/// same process that never called [`lock`](Self::lock) still waits.
#[derive(Debug)]
pub struct SharedState<S: Storage = FileStorage> {
    storage: S,
    holding_lock: bool,
}

impl SharedState<FileStorage> {
    /// Share state through the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(FileStorage::new(path))
    }
}

impl<S: Storage> SharedState<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            holding_lock: false,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Swap the storage, returning the previous one.
    pub fn set_storage(&mut self, storage: S) -> S {
        std::mem::replace(&mut self.storage, storage)
    }

    /// Whether this instance took the data-level mutex and has not released it.
    pub fn is_holding_lock(&self) -> bool {
        self.holding_lock
    }

    /// Value of `name`, or `None` if absent or null.
    pub fn get(&mut self, name: &str) -> Result<Option<Value>> {
        let value = self.read(|entity| entity.data().get(name).cloned())?;
        Ok(value.filter(|v| !v.is_null()))
    }

    /// Value of `name`, or `default` if absent.
    ///
    /// A stored `null` is returned as is; only an absent key yields `default`.
    pub fn get_or(&mut self, name: &str, default: Value) -> Result<Value> {
        let value = self.read(|entity| entity.data().get(name).cloned())?;
        Ok(value.unwrap_or(default))
    }

    /// Store `value` under `name` and return it.
    pub fn set(&mut self, name: &str, value: Value) -> Result<Value> {
        self.write(Wait::UntilUnlocked, |entity| {
            entity.data_mut().insert(name.to_string(), value.clone());
        })?;
        Ok(value)
    }

    /// Delete `name`. Absent names are not an error.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.write(Wait::UntilUnlocked, |entity| {
            entity.data_mut().shift_remove(name);
        })
    }

    /// Whether `name` holds a non-null value.
    ///
    /// A stored `null` cannot be told apart from an absent property.
    pub fn has(&mut self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// The whole property map.
    ///
    /// Pair with [`lock`](Self::lock) / [`unlock`](Self::unlock) when the map
    /// is read, modified and written back with [`set_data`](Self::set_data).
    pub fn data(&mut self) -> Result<Data> {
        self.read(Entity::into_data)
    }

    /// Replace the whole property map.
    pub fn set_data(&mut self, data: Data) -> Result<()> {
        self.write(Wait::UntilUnlocked, |entity| entity.set_data(data))
    }

    /// Take the data-level mutex.
    ///
    /// Waits for any other holder first. Afterwards, other instances wait up to
    /// `timeout` seconds (`0` = forever) for [`unlock`](Self::unlock), polling
    /// every `interval` microseconds (at least 5000).
    pub fn lock(&mut self, timeout: f64, interval: i64) -> Result<()> {
        let interval = validate_lock_parameters(timeout, interval)?;

        self.write(Wait::UntilUnlocked, |entity| {
            entity.set_locked(true);
            entity.set_timeout(timeout);
            entity.set_interval(interval);
        })?;
        self.holding_lock = true;
        log::debug!(
            "took shared mutex on {} storage (timeout: {}s, interval: {}us)",
            self.storage.name(),
            timeout,
            interval
        );
        Ok(())
    }

    /// Release the data-level mutex.
    ///
    /// Never waits, and works whichever instance or process took the mutex.
    pub fn unlock(&mut self) -> Result<()> {
        self.write(Wait::Never, |entity| entity.set_locked(false))?;
        self.holding_lock = false;
        log::debug!("released shared mutex on {} storage", self.storage.name());
        Ok(())
    }

    /// Run `f` on a snapshot taken under a shared lock.
    fn read<T>(&mut self, f: impl FnOnce(Entity) -> T) -> Result<T> {
        self.storage.open_reader()?;
        let entity = self.fetch(Access::Read, Wait::UntilUnlocked);
        self.storage.close();
        Ok(f(entity?))
    }

    /// Run `f` on a snapshot taken under an exclusive lock and persist it.
    ///
    /// The storage is closed on every path, including failures.
    fn write<T>(&mut self, wait: Wait, f: impl FnOnce(&mut Entity) -> T) -> Result<T> {
        self.storage.open_writer()?;
        let result = self.fetch(Access::Write, wait).and_then(|mut entity| {
            let out = f(&mut entity);
            self.storage.set_object(&entity)?;
            Ok(out)
        });
        self.storage.close();
        result
    }
}

/// Whether a fetch honours the data-level mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    UntilUnlocked,
    Never,
}

/// Check `lock` arguments before any I/O; returns the interval as stored.
fn validate_lock_parameters(timeout: f64, interval: i64) -> Result<u64> {
    if !timeout.is_finite() || timeout < 0.0 {
        return Err(SharedError::InvalidParameter {
            name: "timeout",
            reason: format!(
                "lock timeout should be a number greater or equal to 0 (got {})",
                timeout
            ),
        });
    }

    match u64::try_from(interval) {
        Ok(interval) if interval >= MIN_INTERVAL => Ok(interval),
        _ => Err(SharedError::InvalidParameter {
            name: "interval",
            reason: format!(
                "lock check interval should be an integer greater or equal to {} (got {})",
                MIN_INTERVAL, interval
            ),
        }),
    }
}
