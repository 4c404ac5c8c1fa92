//! Implementation of the `progress` command.
//!
//! Simulates a long-running task that publishes a percentage other processes
//! can poll with `sharedfile get`. The property is reset to null once done,
//! so `has` turns false again.

use super::CommandContext;
use crate::cli::ProgressArgs;
use serde_json::{Value, json};
use sharedfile::error::{Result, SharedError};
use std::thread;
use std::time::Duration;

/// Percentage reached after `step` of `steps`.
fn percentage(step: u32, steps: u32) -> u32 {
    (u64::from(step) * 100 / u64::from(steps)) as u32
}

/// Execute the `progress` command.
pub fn cmd_progress(ctx: &CommandContext, args: ProgressArgs) -> Result<()> {
    if args.steps == 0 {
        return Err(SharedError::UserError(
            "progress needs at least one step".to_string(),
        ));
    }

    let mut shared = ctx.shared_state();
    let delay = Duration::from_millis(args.delay_ms);

    for step in 0..=args.steps {
        let pct = percentage(step, args.steps);
        shared.set(&args.name, json!(pct))?;
        log::info!("{}: {}%", args.name, pct);
        if step < args.steps {
            thread::sleep(delay);
        }
    }

    shared.set(&args.name, Value::Null)?;
    println!("done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use tempfile::TempDir;

    #[test]
    fn percentage_spans_zero_to_hundred() {
        assert_eq!(percentage(0, 4), 0);
        assert_eq!(percentage(1, 4), 25);
        assert_eq!(percentage(4, 4), 100);
        assert_eq!(percentage(1, 3), 33);
    }

    #[test]
    fn percentage_handles_huge_step_counts() {
        assert_eq!(percentage(u32::MAX, u32::MAX), 100);
        assert_eq!(percentage(u32::MAX / 2, u32::MAX), 49);
        assert_eq!(percentage(50_000_000, 100_000_000), 50);
    }

    #[test]
    fn progress_clears_the_property_when_done() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir.path().join("progress.sync"));

        cmd_progress(
            &ctx,
            ProgressArgs {
                name: "percentage".to_string(),
                steps: 3,
                delay_ms: 0,
            },
        )
        .unwrap();

        let mut shared = ctx.shared_state();
        assert!(!shared.has("percentage").unwrap());
        assert!(shared.data().unwrap().contains_key("percentage"));
    }

    #[test]
    fn progress_rejects_zero_steps() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir.path().join("progress.sync"));

        let err = cmd_progress(
            &ctx,
            ProgressArgs {
                name: "percentage".to_string(),
                steps: 0,
                delay_ms: 0,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one step"));
    }
}
