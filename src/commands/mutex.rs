//! Mutex commands: `lock`, `unlock`, and the `increment` / `race` demo.
//!
//! `race` spawns several `increment` processes against one file. Without
//! `--mutex` they all read the same counter before any of them writes it
//! back, so increments get lost; with `--mutex` the final count always
//! equals the number of workers.

use super::CommandContext;
use crate::cli::{IncrementArgs, LockArgs, RaceArgs};
use serde_json::{Value, json};
use sharedfile::error::{Result, SharedError};
use sharedfile::{SharedState, Storage};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Execute the `lock` command.
pub fn cmd_lock(ctx: &CommandContext, args: LockArgs) -> Result<()> {
    let (default_timeout, default_interval) = ctx.lock_defaults()?;
    let timeout = args.timeout.unwrap_or(default_timeout);
    let interval = args.interval.unwrap_or(default_interval);

    ctx.shared_state().lock(timeout, interval)?;
    println!(
        "locked '{}' (timeout: {}s, interval: {}us)",
        ctx.file().display(),
        timeout,
        interval
    );
    Ok(())
}

/// Execute the `unlock` command.
pub fn cmd_unlock(ctx: &CommandContext) -> Result<()> {
    ctx.shared_state().unlock()?;
    println!("unlocked '{}'", ctx.file().display());
    Ok(())
}

/// Read, pause, then write back `name + 1`. Returns the written value.
pub(crate) fn increment_once<S: Storage>(
    shared: &mut SharedState<S>,
    name: &str,
    delay: Duration,
) -> Result<i64> {
    let current = match shared.get_or(name, json!(0))? {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            SharedError::UserError(format!("property '{}' is not an integer: {}", name, n))
        })?,
        other => {
            return Err(SharedError::UserError(format!(
                "property '{}' is not a number: {}",
                name, other
            )));
        }
    };

    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let next = current + 1;
    shared.set(name, json!(next))?;
    Ok(next)
}

/// Execute the `increment` command.
pub fn cmd_increment(ctx: &CommandContext, args: IncrementArgs) -> Result<()> {
    let mut shared = ctx.shared_state();
    let delay = Duration::from_millis(args.delay_ms);

    if !args.mutex {
        let value = increment_once(&mut shared, &args.name, delay)?;
        println!("{}", value);
        return Ok(());
    }

    let (timeout, interval) = ctx.lock_defaults()?;
    shared.lock(timeout, interval)?;
    let result = increment_once(&mut shared, &args.name, delay);
    // Release even when the critical section failed
    let unlocked = shared.unlock();

    let value = result?;
    unlocked?;
    println!("{}", value);
    Ok(())
}

/// Execute the `race` command.
pub fn cmd_race(ctx: &CommandContext, args: RaceArgs) -> Result<()> {
    if args.workers == 0 {
        return Err(SharedError::UserError(
            "race needs at least one worker".to_string(),
        ));
    }

    let exe = std::env::current_exe().map_err(|e| {
        SharedError::UserError(format!("failed to locate the sharedfile binary: {}", e))
    })?;

    ctx.shared_state().set(&args.name, json!(0))?;

    let mut children = Vec::with_capacity(args.workers);
    for _ in 0..args.workers {
        let mut command = Command::new(&exe);
        command.arg("--file").arg(ctx.file());
        if let Some(config) = &ctx.config_path {
            command.arg("--config").arg(config);
        }
        command
            .arg("increment")
            .arg(&args.name)
            .arg("--delay-ms")
            .arg(args.delay_ms.to_string());
        if args.mutex {
            command.arg("--mutex");
        }

        let child = command
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| SharedError::UserError(format!("failed to spawn worker: {}", e)))?;
        children.push(child);
    }

    let mut failed = 0;
    for mut child in children {
        match child.wait() {
            Ok(status) if status.success() => {}
            Ok(status) => {
                log::warn!("worker exited with {}", status);
                failed += 1;
            }
            Err(e) => {
                log::warn!("failed to wait for worker: {}", e);
                failed += 1;
            }
        }
    }

    let count = ctx.shared_state().get_or(&args.name, json!(0))?;
    println!(
        "{} {} workers, final count: {} (expected {})",
        if args.mutex { "with mutex," } else { "without mutex," },
        args.workers,
        count,
        args.workers
    );

    if failed > 0 {
        return Err(SharedError::UserError(format!(
            "{} of {} workers failed",
            failed, args.workers
        )));
    }
    Ok(())
}
