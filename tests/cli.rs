//! End-to-end tests driving the `sharedfile` binary as separate processes.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn state_file(dir: &TempDir) -> PathBuf {
    dir.path().join("state.sync")
}

fn sharedfile(file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sharedfile"))
        .arg("--file")
        .arg(file)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run sharedfile {}: {}", args.join(" "), e))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "exit {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

#[test]
fn hello_world_across_processes() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    assert_eq!(stdout(&sharedfile(&file, &["has", "hello"])), "false");
    assert!(!file.exists());

    assert_success(&sharedfile(&file, &["set", "hello", "world"]));
    assert!(file.exists());

    assert_eq!(stdout(&sharedfile(&file, &["get", "hello"])), "\"world\"");
    assert_eq!(stdout(&sharedfile(&file, &["has", "hello"])), "true");

    assert_success(&sharedfile(&file, &["remove", "hello"]));
    assert_eq!(stdout(&sharedfile(&file, &["get", "hello"])), "null");
    assert_eq!(stdout(&sharedfile(&file, &["has", "hello"])), "false");
}

#[test]
fn get_prints_default_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    let output = sharedfile(&file, &["get", "nothing", "--default", "42"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "42");
    assert!(!file.exists());
}

#[test]
fn mutex_prevents_lost_increments() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    let output = sharedfile(
        &file,
        &["race", "--workers", "4", "--mutex", "--delay-ms", "50"],
    );
    assert_success(&output);
    assert!(
        stdout(&output).contains("final count: 4 (expected 4)"),
        "{}",
        stdout(&output)
    );
    assert_eq!(stdout(&sharedfile(&file, &["get", "counter"])), "4");
}

#[test]
fn without_mutex_increments_get_lost() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    let output = sharedfile(&file, &["race", "--workers", "4", "--delay-ms", "500"]);
    assert_success(&output);

    let count: u64 = stdout(&sharedfile(&file, &["get", "counter"]))
        .parse()
        .unwrap();
    assert!((1..4).contains(&count), "count was {}", count);
}

#[test]
fn lock_held_by_dead_process_times_out() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    assert_success(&sharedfile(&file, &["set", "hello", "world"]));
    assert_success(&sharedfile(
        &file,
        &["lock", "--timeout", "1", "--interval", "5000"],
    ));

    let start = Instant::now();
    let output = sharedfile(&file, &["get", "hello"]);
    let waited = start.elapsed();

    assert_eq!(output.status.code(), Some(3));
    assert!(
        stderr(&output).contains("still locked after 1 second(s)"),
        "{}",
        stderr(&output)
    );
    assert!(waited >= Duration::from_millis(900), "gave up after {:?}", waited);
    assert!(waited < Duration::from_secs(10), "waited {:?}", waited);
}

#[test]
fn any_process_can_unlock() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    assert_success(&sharedfile(&file, &["set", "hello", "world"]));
    assert_success(&sharedfile(&file, &["lock", "--timeout", "0"]));
    assert_success(&sharedfile(&file, &["unlock"]));

    let output = sharedfile(&file, &["get", "hello"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "\"world\"");
}

#[test]
fn invalid_lock_parameters_are_rejected_before_io() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);

    let output = sharedfile(&file, &["lock", "--timeout", "-1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("timeout"));

    let output = sharedfile(&file, &["lock", "--interval", "4999"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("interval"));

    assert!(!file.exists());
    assert_success(&sharedfile(&file, &["lock", "--timeout", "0", "--interval", "5000"]));
}

#[test]
fn missing_directory_is_a_storage_failure() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("missing").join("state.sync");

    let output = sharedfile(&file, &["set", "hello", "world"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist or is not writable"));
}

#[test]
fn load_and_dump_whole_state() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);
    let input = dir.path().join("input.json");
    std::fs::write(&input, r#"{"hello": "world", "n": 3}"#).unwrap();

    assert_success(&sharedfile(&file, &["load", input.to_str().unwrap()]));

    let dumped: serde_json::Value =
        serde_json::from_str(&stdout(&sharedfile(&file, &["dump"]))).unwrap();
    assert_eq!(dumped, serde_json::json!({"hello": "world", "n": 3}));
}

#[test]
fn config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let file = state_file(&dir);
    let config = dir.path().join("config.yaml");
    std::fs::write(
        &config,
        format!("file: {}\nlock_timeout: 0.5\nlock_interval: 5000\n", file.display()),
    )
    .unwrap();

    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_sharedfile"))
            .arg("--config")
            .arg(&config)
            .args(args)
            .output()
            .unwrap()
    };

    assert_success(&run(&["lock"]));
    let output = run(&["get", "x"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("still locked after 0.5 second(s)"));
}
