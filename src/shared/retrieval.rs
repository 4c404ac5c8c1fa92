//! Lock-aware retrieval: wait for the data-level mutex to clear.

use super::{SharedState, Wait};
use crate::entity::Entity;
use crate::error::{Result, SharedError};
use crate::storage::{Access, Storage};
use std::thread;
use std::time::Duration;

impl<S: Storage> SharedState<S> {
    /// Read the entity from the already opened storage, waiting while another
    /// instance holds the data-level mutex.
    ///
    /// Between polls the storage lock is released so the holder can make
    /// progress; it is reacquired in `access` mode before each re-read. The
    /// `interval` and `timeout` stored in the entity are re-read on every pass
    /// and always win over what this instance would use. Only the polls made
    /// while the stored timeout is non-zero count toward it.
    ///
    /// On success the storage is left open in `access` mode. On failure it may
    /// be open or closed; callers close it either way.
    pub(super) fn fetch(&mut self, access: Access, wait: Wait) -> Result<Entity> {
        let mut entity = self.storage.get_object()?;
        if wait == Wait::Never || self.holding_lock {
            return Ok(entity);
        }

        let mut elapsed_us: u64 = 0;
        while entity.is_locked() {
            let interval = entity.interval();
            self.storage.close();
            log::trace!("shared state is locked, retrying in {}us", interval);
            thread::sleep(Duration::from_micros(interval));

            self.storage.open(access)?;
            entity = self.storage.get_object()?;

            // Time spent under a lock without timeout does not count
            let timeout = entity.timeout();
            if !entity.is_locked() || timeout <= 0.0 {
                continue;
            }
            elapsed_us = elapsed_us.saturating_add(interval);
            if elapsed_us as f64 >= timeout * 1e6 {
                log::debug!(
                    "gave up waiting for shared mutex after {}us (timeout: {}s)",
                    elapsed_us,
                    timeout
                );
                return Err(SharedError::LockTimeoutExceeded { timeout });
            }
        }
        Ok(entity)
    }
}
