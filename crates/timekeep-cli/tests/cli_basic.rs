//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "timekeep-cli", "--"])
        .args(args)
        .env("TIMEKEEP_DATA_DIR", data_dir)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success, and parse the JSON output.
fn run_cli_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "command failed: {args:?}\nstderr: {stderr}");
    serde_json::from_str(&stdout).expect("invalid JSON output")
}

#[test]
fn timer_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    let timer = run_cli_json(dir.path(), &["timer", "create", "Focus", "00:10:00"]);
    assert_eq!(timer["total"], "00:10:00");
    assert_eq!(timer["status"], "upcoming");
    let id = timer["id"].as_str().unwrap().to_string();

    let event = run_cli_json(dir.path(), &["timer", "start", &id]);
    assert_eq!(event["type"], "TimerStarted");

    let snapshot = run_cli_json(dir.path(), &["timer", "status", &id]);
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["status"], "running");

    let event = run_cli_json(dir.path(), &["timer", "borrow", &id, "60"]);
    assert_eq!(event["type"], "TimeBorrowed");
    assert_eq!(event["borrowed_total_secs"], 60);

    let event = run_cli_json(dir.path(), &["timer", "complete", &id]);
    assert_eq!(event["type"], "TimerCompleted");
    assert_eq!(event["forced"], true);
    assert!(event["saved_secs"].as_u64().unwrap() > 0);

    let event = run_cli_json(dir.path(), &["timer", "ack", &id]);
    assert_eq!(event["type"], "TimerAcknowledged");

    // Acknowledgement is one-shot.
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "ack", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already acknowledged"), "stderr: {stderr}");
}

#[test]
fn timer_list_and_delete() {
    let dir = tempfile::tempdir().unwrap();

    let first = run_cli_json(dir.path(), &["timer", "create", "One", "05:00"]);
    run_cli_json(dir.path(), &["timer", "create", "Two", "10:00"]);

    let list = run_cli_json(dir.path(), &["timer", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let id = first["id"].as_str().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "delete", id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("deleted"));

    let list = run_cli_json(dir.path(), &["timer", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn malformed_duration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "create", "Bad", "abc"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("malformed duration"), "stderr: {stderr}");
}

#[test]
fn task_stage_flow() {
    let dir = tempfile::tempdir().unwrap();

    let task = run_cli_json(
        dir.path(),
        &["task", "create", "Write report", "--priority", "high"],
    );
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["status"], "Pending");
    assert_eq!(task["priority"], "High");

    let stage = run_cli_json(
        dir.path(),
        &[
            "stage", "add", &task_id, "Outline", "--start", "09:30", "--duration", "45",
        ],
    );
    let stage_id = stage["id"].as_str().unwrap().to_string();
    assert_eq!(stage["start_time_minutes"], 570);

    run_cli_json(dir.path(), &["stage", "start", &task_id, &stage_id]);
    let event = run_cli_json(dir.path(), &["stage", "done", &task_id, &stage_id]);
    assert_eq!(event["type"], "StageStatusChanged");
    assert_eq!(event["to"], "Done");

    let stages = run_cli_json(dir.path(), &["stage", "list", &task_id]);
    assert_eq!(stages[0]["completed"], true);

    // Done is terminal for the strict table.
    let (_, stderr, code) = run_cli(dir.path(), &["stage", "done", &task_id, &stage_id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid stage transition"), "stderr: {stderr}");

    // The correction popup path still works.
    let event = run_cli_json(
        dir.path(),
        &["stage", "set", &task_id, &stage_id, "undone"],
    );
    assert_eq!(event["forced"], true);
}

#[test]
fn recurring_task_builds_a_streak() {
    let dir = tempfile::tempdir().unwrap();

    let task = run_cli_json(
        dir.path(),
        &["task", "create", "Morning routine", "--recur", "daily"],
    );
    let task_id = task["id"].as_str().unwrap().to_string();

    run_cli_json(
        dir.path(),
        &["task", "complete", &task_id, "--date", "2026-08-06"],
    );
    run_cli_json(
        dir.path(),
        &["task", "complete", &task_id, "--date", "2026-08-07"],
    );

    let task = run_cli_json(dir.path(), &["task", "get", &task_id]);
    assert_eq!(task["streak"]["count"], 2);
    assert_eq!(
        task["recurrence_instances"]["2026-08-07"]["status"],
        "Completed"
    );
}

#[test]
fn category_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let category = run_cli_json(
        dir.path(),
        &["category", "add", "Work", "--color", "#ff8800"],
    );
    let id = category["id"].as_str().unwrap().to_string();

    let list = run_cli_json(dir.path(), &["category", "list"]);
    assert_eq!(list[0]["name"], "Work");
    assert_eq!(list[0]["color"], "#ff8800");

    let (stdout, _, code) = run_cli(dir.path(), &["category", "remove", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("removed"));

    let list = run_cli_json(dir.path(), &["category", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn config_get_and_set() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "appearance.dark_mode"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "appearance.dark_mode", "false"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "appearance.dark_mode"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "appearance.nope"]);
    assert_ne!(code, 0);
}

#[test]
fn completed_timers_show_up_in_stats() {
    let dir = tempfile::tempdir().unwrap();

    let timer = run_cli_json(dir.path(), &["timer", "create", "Session", "10:00"]);
    let id = timer["id"].as_str().unwrap().to_string();
    run_cli_json(dir.path(), &["timer", "start", &id]);
    run_cli_json(dir.path(), &["timer", "complete", &id]);

    let stats = run_cli_json(dir.path(), &["stats", "all"]);
    assert_eq!(stats["total_completed"], 1);
    assert_eq!(stats["total_allocated_secs"], 600);

    let recent = run_cli_json(dir.path(), &["stats", "recent"]);
    assert_eq!(recent[0]["title"], "Session");
}

#[test]
fn activity_payload_for_running_timer() {
    let dir = tempfile::tempdir().unwrap();

    let timer = run_cli_json(dir.path(), &["timer", "create", "Focus", "30:00"]);
    let id = timer["id"].as_str().unwrap().to_string();
    run_cli_json(dir.path(), &["timer", "start", &id]);

    let update = run_cli_json(dir.path(), &["timer", "activity", &id]);
    assert_eq!(update["status"], "running");
    assert_eq!(update["title"], "Focus");
    assert!(update["end_time"].as_i64().unwrap() > 0);
    let progress = update["progress"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&progress));
}

#[test]
fn completions_generate() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("timekeep-cli"));
}
