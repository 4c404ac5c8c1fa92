//! Command implementations for sharedfile.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, and the context every handler receives: the resolved
//! configuration with command line overrides applied.

mod mutex;
mod progress;
mod property;

use crate::cli::{Cli, Command};
use sharedfile::config::Config;
use sharedfile::error::{Result, SharedError};
use sharedfile::SharedState;
use std::path::{Path, PathBuf};

/// Resolved settings shared by all command handlers.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    /// Config file explicitly requested on the command line, forwarded to
    /// child processes.
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Resolve the config and apply `--file`.
    pub fn resolve(file: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            SharedError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let mut config = Config::discover(config_path.as_deref(), &cwd)?;
        if let Some(file) = file {
            config.file = file;
        }
        log::debug!("shared state file: '{}'", config.file.display());

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn file(&self) -> &Path {
        &self.config.file
    }

    pub fn shared_state(&self) -> SharedState {
        self.config.shared_state()
    }

    /// Lock timeout and interval from the config, as accepted by `lock`.
    pub fn lock_defaults(&self) -> Result<(f64, i64)> {
        let interval = i64::try_from(self.config.lock_interval).map_err(|_| {
            SharedError::UserError(format!(
                "lock_interval {} is out of range",
                self.config.lock_interval
            ))
        })?;
        Ok((self.config.lock_timeout, interval))
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = CommandContext::resolve(cli.file, cli.config)?;

    match cli.command {
        Command::Get(args) => property::cmd_get(&ctx, args),
        Command::Set(args) => property::cmd_set(&ctx, args),
        Command::Remove(args) => property::cmd_remove(&ctx, args),
        Command::Has(args) => property::cmd_has(&ctx, args),
        Command::Dump => property::cmd_dump(&ctx),
        Command::Load(args) => property::cmd_load(&ctx, args),
        Command::Lock(args) => mutex::cmd_lock(&ctx, args),
        Command::Unlock => mutex::cmd_unlock(&ctx),
        Command::Increment(args) => mutex::cmd_increment(&ctx, args),
        Command::Race(args) => mutex::cmd_race(&ctx, args),
        Command::Progress(args) => progress::cmd_progress(&ctx, args),
    }
}

#[cfg(test)]
pub(crate) fn test_context(file: &Path) -> CommandContext {
    CommandContext {
        config: Config {
            file: file.to_path_buf(),
            ..Config::default()
        },
        config_path: None,
    }
}
