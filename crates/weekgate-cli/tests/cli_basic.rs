//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with a pinned `--now` and a throwaway HOME
//! so the config file never touches the real one.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_weekgate-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("WEEKGATE_ENV")
        .env_remove("WEEKGATE_DEV_MODE")
        .env_remove("WEEKGATE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_gate_check_locked_then_unlocked() {
    let home = tempfile::tempdir().unwrap();
    let before = run_json(
        home.path(),
        &["gate", "check", "2026-02-14", "--now", "2026-02-13T23:59:59"],
    );
    assert_eq!(before["decision"], "locked");
    assert_eq!(before["unlocked"], false);

    let after = run_json(
        home.path(),
        &["gate", "check", "2026-02-14", "--now", "2026-02-14T00:00:00"],
    );
    assert_eq!(after["decision"], "unlocked");
}

#[test]
fn test_gate_check_dev_mode() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["gate", "check", "2026-02-14", "--now", "2026-01-01T09:00:00", "--dev-mode"],
    );
    assert_eq!(out["unlocked"], true);
    assert_eq!(out["dev_mode"], true);
}

#[test]
fn test_gate_check_rejects_bad_date() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["gate", "check", "14/02/2026"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_gate_days() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["gate", "days", "2026-02-14", "--now", "2026-02-10T18:00:00"],
    );
    assert_eq!(out["days_remaining"], 4);
    assert_eq!(out["is_today"], false);
    assert_eq!(out["friendly"], "Saturday, Feb 14");
}

#[test]
fn test_schedule_list() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["schedule", "list", "--year", "2026", "--now", "2026-02-10T12:00:00"],
    );
    let rows = out.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["slug"], "rose_day");
    assert_eq!(rows[3]["state"], "unlocked");
    assert_eq!(rows[4]["state"], "locked");
    assert_eq!(rows[7]["label"], "Valentine's Day");
}

#[test]
fn test_schedule_next() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(home.path(), &["schedule", "next", "--now", "2026-02-10T12:00:00"]);
    assert_eq!(out["next"]["slug"], "promise_day");

    let over = run_json(home.path(), &["schedule", "next", "--now", "2026-03-01T12:00:00"]);
    assert!(over["next"].is_null());
}

#[test]
fn test_countdown_once() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["countdown", "--to", "2026-02-14", "--once", "--now", "2026-02-11T13:14:40"],
    );
    assert_eq!(out["display"], "2d 10:45:20");
    assert_eq!(out["completed"], false);
    assert_eq!(out["phase"], "running");
}

#[test]
fn test_countdown_once_next_event() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["countdown", "--once", "--now", "2026-02-13T23:00:00"],
    );
    assert_eq!(out["label"], "Valentine's Day");
    assert_eq!(out["display"], "01:00:00");
}

#[test]
fn test_access_requires_login() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["access", "Pages/rose_day.html", "--now", "2026-02-10T12:00:00"],
    );
    assert_eq!(out["decision"]["reason"], "unauthenticated");
    assert_eq!(out["navigation"]["action"], "redirect");
    assert_eq!(out["navigation"]["to"], "index.html");
}

#[test]
fn test_access_gated_day() {
    let home = tempfile::tempdir().unwrap();
    let open = run_json(
        home.path(),
        &["access", "Pages/rose_day.html", "--name", "Alex", "--now", "2026-02-10T12:00:00"],
    );
    assert_eq!(open["decision"]["allow"], true);
    assert_eq!(open["navigation"]["action"], "stay");

    let locked = run_json(
        home.path(),
        &["access", "hug_day.html", "--name", "Alex", "--card", "--now", "2026-02-10T12:00:00"],
    );
    assert_eq!(locked["decision"]["reason"], "not_yet_unlocked");
    assert_eq!(locked["navigation"]["action"], "intercept");
}

#[test]
fn test_dashboard() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(
        home.path(),
        &["dashboard", "--name", "Alex", "--now", "2026-02-13T23:00:00"],
    );
    assert_eq!(out["identity"]["name"], "Alex");
    assert_eq!(out["timer_label"], "Next: Valentine's Day");
    assert_eq!(out["timer"], "01:00:00");
    let cards = out["cards"].as_array().unwrap();
    assert_eq!(cards[6]["badge_text"], "Open");
    assert_eq!(cards[7]["badge_text"], "Locked");

    let anonymous = run_json(home.path(), &["dashboard", "--now", "2026-02-13T23:00:00"]);
    assert_eq!(anonymous["to"], "index.html");
}

#[test]
fn test_config_set_get_reset() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "gate.dev_mode"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "schedule.year", "2027"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.year"]);
    assert_eq!(stdout.trim(), "2027");

    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "gate.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("gate.nope"));

    let (code, _, _) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let list = run_json(home.path(), &["config", "list"]);
    assert!(list["schedule"].get("year").map_or(true, Value::is_null));
}

#[test]
fn test_out_of_range_year_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["schedule", "list", "--year", "999999"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("999999-02-07"));

    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "schedule.year", "999999"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("schedule.year"));
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.year"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_config_unset_year() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "schedule.year", "2027"]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(home.path(), &["config", "set", "schedule.year", "null"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.year"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_gate_check_rejects_unpadded_date() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["gate", "check", "2026-2-7"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("2026-2-7"));
}
