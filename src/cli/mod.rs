//! CLI argument parsing for sharedfile.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// sharedfile: key/value state shared between processes through a locked file.
///
/// Every command opens the state file, takes an advisory lock for the duration
/// of the operation, and releases it before exiting.
#[derive(Parser, Debug)]
#[command(name = "sharedfile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Shared state file (overrides the config file).
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Config file (default: `.sharedfile.yaml` in the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for sharedfile.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value of a property as JSON.
    Get(GetArgs),

    /// Store a property.
    ///
    /// VALUE is parsed as JSON; anything that is not valid JSON is stored
    /// as a plain string.
    Set(SetArgs),

    /// Delete a property (no error if absent).
    Remove(NameArgs),

    /// Print whether a property holds a non-null value.
    Has(NameArgs),

    /// Print the whole property map as JSON.
    Dump,

    /// Replace the whole property map with a JSON object.
    Load(LoadArgs),

    /// Take the shared mutex.
    ///
    /// The mutex outlives this process: other processes wait until `unlock`
    /// or until the timeout elapses.
    Lock(LockArgs),

    /// Release the shared mutex, whoever took it.
    Unlock,

    /// Increment a counter property by one.
    ///
    /// Demonstrates the read-modify-write race the mutex prevents.
    Increment(IncrementArgs),

    /// Run several `increment` processes against the same file and report
    /// the final count.
    Race(RaceArgs),

    /// Simulate a long-running task publishing its progress.
    ///
    /// Sets NAME from 0 to 100, then back to null when done.
    Progress(ProgressArgs),
}

/// Arguments for the `get` command.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Property name.
    pub name: String,

    /// JSON value printed when the property is absent.
    #[arg(long)]
    pub default: Option<String>,
}

/// Arguments for the `set` command.
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Property name.
    pub name: String,

    /// Value to store.
    pub value: String,

    /// Store VALUE as a string without trying to parse it as JSON.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for commands taking a single property name.
#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Property name.
    pub name: String,
}

/// Arguments for the `load` command.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// JSON file holding an object, or `-` for stdin.
    pub input: String,
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Seconds other processes wait before failing (0 = forever).
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<f64>,

    /// Microseconds between two checks by waiting processes.
    #[arg(long, allow_negative_numbers = true)]
    pub interval: Option<i64>,
}

/// Arguments for the `increment` command.
#[derive(Parser, Debug)]
pub struct IncrementArgs {
    /// Counter property name.
    #[arg(default_value = "counter")]
    pub name: String,

    /// Guard the read-modify-write with the shared mutex.
    #[arg(long)]
    pub mutex: bool,

    /// Pause between reading and writing the counter, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

/// Arguments for the `race` command.
#[derive(Parser, Debug)]
pub struct RaceArgs {
    /// Number of concurrent processes.
    #[arg(long, default_value_t = 5)]
    pub workers: usize,

    /// Counter property name.
    #[arg(long, default_value = "counter")]
    pub name: String,

    /// Guard each increment with the shared mutex.
    #[arg(long)]
    pub mutex: bool,

    /// Pause between reading and writing the counter, in milliseconds.
    #[arg(long, default_value_t = 200)]
    pub delay_ms: u64,
}

/// Arguments for the `progress` command.
#[derive(Parser, Debug)]
pub struct ProgressArgs {
    /// Property receiving the percentage.
    #[arg(default_value = "percentage")]
    pub name: String,

    /// Number of steps from 0 to 100.
    #[arg(long, default_value_t = 100)]
    pub steps: u32,

    /// Pause between two steps, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
