//! Configuration for sharedfile.
//!
//! The `Config` struct represents an optional YAML file (`.sharedfile.yaml` or
//! the path given with `--config`). Unknown fields are ignored for forward
//! compatibility and every field has a default, so an empty file is valid.

mod model;
mod operations;


// Re-export public API
pub use model::{Config, DEFAULT_CONFIG_FILE};
