//! Error types for sharedfile.
//!
//! Uses thiserror for derive macros. Every variant carries enough context
//! (path, parameter name, timeout) to be reported to a user unchanged.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sharedfile operations.
#[derive(Error, Debug)]
pub enum SharedError {
    /// The state file exists but cannot be read.
    #[error("file '{}' is not readable", .0.display())]
    FileNotReadable(PathBuf),

    /// The state file exists but cannot be written.
    #[error("file '{}' is not writable", .0.display())]
    FileNotWritable(PathBuf),

    /// The state file does not exist and its directory cannot receive it.
    #[error("directory '{}' does not exist or is not writable", .0.display())]
    DirectoryNotWritable(PathBuf),

    /// The state file could not be opened.
    #[error("can't open '{}': {reason}", .path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// The OS advisory lock could not be taken.
    #[error("can't lock '{}': {reason}", .path.display())]
    LockFailed { path: PathBuf, reason: String },

    /// Reading, truncating or writing the locked file failed.
    #[error("I/O on '{}' failed: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// `lock` was called with an out-of-range parameter.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The data-level mutex stayed held longer than its timeout.
    #[error("can't access shared state, it is still locked after {timeout} second(s)")]
    LockTimeoutExceeded { timeout: f64 },

    /// Bad command line input or configuration.
    #[error("{0}")]
    UserError(String),
}

impl SharedError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SharedError::UserError(_) | SharedError::InvalidParameter { .. } => {
                exit_codes::USER_ERROR
            }
            SharedError::FileNotReadable(_)
            | SharedError::FileNotWritable(_)
            | SharedError::DirectoryNotWritable(_)
            | SharedError::OpenFailed { .. }
            | SharedError::WriteFailed { .. } => exit_codes::STORAGE_FAILURE,
            SharedError::LockFailed { .. } | SharedError::LockTimeoutExceeded { .. } => {
                exit_codes::LOCK_FAILURE
            }
        }
    }
}

/// Result type alias for sharedfile operations.
pub type Result<T> = std::result::Result<T, SharedError>;
