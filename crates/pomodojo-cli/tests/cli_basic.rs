//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and verify
//! its JSON output.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomodojo"))
        .args(args)
        .env("POMODOJO_DATA_DIR", data_dir)
        .env_remove("POMODOJO_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_session_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    let started = run_json(dir.path(), &["session", "start", "--quote", "quote-naruto-01"]);
    assert_eq!(started["events"][0]["type"], "SessionStarted");
    assert_eq!(started["state"]["status"], "running");
    assert_eq!(started["notification"]["title"], "Focus 1 of 4");

    // A second start picks up the saved session.
    let again = run_json(dir.path(), &["session", "start"]);
    assert_eq!(again["events"].as_array().unwrap().len(), 0);
    assert_eq!(again["state"]["session_id"], started["state"]["session_id"]);

    let paused = run_json(dir.path(), &["session", "pause"]);
    assert_eq!(paused["events"][0]["type"], "SegmentPaused");
    assert_eq!(paused["notification"]["is_paused"], true);

    let resumed = run_json(dir.path(), &["session", "toggle"]);
    assert_eq!(resumed["events"][0]["type"], "SegmentResumed");

    let cancelled = run_json(dir.path(), &["session", "cancel"]);
    assert_eq!(cancelled["events"][0]["type"], "SessionCancelled");
    assert!(cancelled["state"].is_null());

    let status = run_json(dir.path(), &["session", "status"]);
    assert!(status["state"].is_null());
}

#[test]
fn test_finish_records_history() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["session", "start"]);

    let finished = run_json(dir.path(), &["session", "finish"]);
    let events = finished["events"].as_array().unwrap();
    assert_eq!(events.last().unwrap()["type"], "SessionCompleted");
    assert_eq!(events.last().unwrap()["summary"]["total_focus_minutes"], 25);

    let today = run_json(dir.path(), &["history", "today"]);
    assert_eq!(today["focus_minutes"], 25);
    assert_eq!(today["completed_cycles"], 1);

    let years = run_json(dir.path(), &["history", "years"]);
    assert_eq!(years.as_array().unwrap().len(), 1);
}

#[test]
fn test_preferences_cascade() {
    let dir = tempfile::tempdir().unwrap();

    let shown = run_json(dir.path(), &["preferences", "show"]);
    assert_eq!(shown["preferences"]["focus_minutes"], 25);

    let updated = run_json(dir.path(), &["preferences", "focus", "50"]);
    assert_eq!(updated["preferences"]["break_minutes"], 10);
    assert_eq!(updated["preferences"]["long_break_after"], 2);
    assert_eq!(updated["preferences"]["long_break_minutes"], 20);

    let (_, stderr, code) = run_cli(dir.path(), &["preferences", "focus", "30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unsupported focus value: 30 minutes"));
}

#[test]
fn test_preferences_timeline() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["preferences", "repeat", "5"]);
    run_json(
        dir.path(),
        &["preferences", "long-break", "--after", "2", "--minutes", "15"],
    );

    let timeline = run_json(dir.path(), &["preferences", "timeline"]);
    assert_eq!(timeline["segments"].as_array().unwrap().len(), 9);
    assert_eq!(timeline["segments"][3]["timer_type"], "long_break");
    assert_eq!(timeline["total_minutes"], 165);
    assert_eq!(timeline["hour_splits"], serde_json::json!([60, 60, 45]));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "ui.theme"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "dark");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "ui.theme", "light"]);
    assert_eq!(code, 0);
    let listed = run_json(dir.path(), &["config", "list"]);
    assert_eq!(listed["ui"]["theme"], "light");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "preferences.repeat_count", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomodojo"));
}
