//! sharedfile: share mutable key/value state between unrelated processes.
//!
//! A regular file is the rendezvous point. Every operation takes an OS
//! advisory lock on it (shared for reads, exclusive for writes), reads the
//! whole state, and for mutations writes the whole state back. On top of that,
//! [`SharedState::lock`] / [`SharedState::unlock`] provide a cooperative,
//! timeout-bounded mutex spanning several operations.
//!
//! Only serializable values can be shared; live resources such as open
//! connections or file handles cannot.

pub mod config;
pub mod entity;
pub mod error;
pub mod exit_codes;
pub mod shared;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use entity::{Data, Entity};
pub use error::{Result, SharedError};
pub use shared::SharedState;
pub use storage::{Access, FileStorage, Storage};
