//! Storage backends for shared state.
//!
//! A storage turns an [`Entity`] into durable bytes and guards every
//! open/close cycle with an OS-level advisory lock:
//! - readers take a **shared** lock, so any number of them may read at once
//! - writers take an **exclusive** lock, serialized against readers and writers
//!
//! The advisory lock only covers one open/close cycle. Multi-step critical
//! sections are the job of the data-level mutex stored inside the entity,
//! handled by [`crate::shared`].

mod file;


pub use file::{DEFAULT_CHUNK_SIZE, FileStorage};

use crate::entity::Entity;
use crate::error::Result;

/// Mode a storage is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Shared lock, read only.
    Read,
    /// Exclusive lock, read and write.
    Write,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }
}

/// A resource able to hold one entity for several processes.
pub trait Storage {
    /// Open for reading under a shared lock, blocking until it is granted.
    ///
    /// A missing resource is not an error: it reads as the empty state.
    /// No-op if already open for reading; a writer is closed and reopened.
    fn open_reader(&mut self) -> Result<()>;

    /// Open for writing under an exclusive lock, blocking until it is granted.
    ///
    /// No-op if already open for writing; a reader is closed and reopened.
    fn open_writer(&mut self) -> Result<()>;

    /// Read the stored entity, or the default entity if there is none.
    fn get_object(&mut self) -> Result<Entity>;

    /// Replace the stored entity as a whole.
    fn set_object(&mut self, entity: &Entity) -> Result<()>;

    /// Release the lock and the underlying handle. No-op when closed.
    fn close(&mut self);

    /// Short backend name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Open in the given mode.
    fn open(&mut self, access: Access) -> Result<()> {
        match access {
            Access::Read => self.open_reader(),
            Access::Write => self.open_writer(),
        }
    }
}
