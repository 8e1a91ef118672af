//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "terp-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_calculate_day_default_bookings() {
    let output = run_cli(&["calculate-day", "--employee", "e1", "--date", "2026-03-02"]);
    assert_eq!(output.2, 0, "calculate-day failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("not json");
    assert_eq!(parsed["employee_id"], "e1");
}

#[test]
fn test_calculate_day_rejects_bad_date() {
    let output = run_cli(&["calculate-day", "--employee", "e1", "--date", "not-a-date"]);
    assert_ne!(output.2, 0, "expected failure for malformed date");
}

#[test]
fn test_calculate_day_from_bookings_file() {
    let dir = std::env::temp_dir();
    let path = dir.join("terp-cli-test-bookings.json");
    std::fs::write(
        &path,
        r#"[{
            "id": "b1", "tenant_id": "demo", "employee_id": "e1", "date": "2026-03-02",
            "raw_time": 480, "edited_time": 480, "calculated_time": null,
            "booking_type_id": "come", "pair_id": null, "source": "web",
            "reason_code": null, "is_auto_generated": false, "original_booking_id": null,
            "notes": null, "created_at": "2026-03-02T08:00:00Z", "updated_at": "2026-03-02T08:00:00Z"
        }]"#,
    )
    .unwrap();

    let output = run_cli(&[
        "calculate-day",
        "--employee",
        "e1",
        "--date",
        "2026-03-02",
        "--bookings-json",
        path.to_str().unwrap(),
    ]);
    assert_eq!(output.2, 0, "calculate-day with bookings file failed: {}", output.1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_recalculate_reports_dirty_day_and_month() {
    let output = run_cli(&["recalculate", "--employee", "e1", "--date", "2026-03-02"]);
    assert_eq!(output.2, 0, "recalculate failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("not json");
    assert!(parsed["dirty_days"].as_array().is_some_and(|d| !d.is_empty()));
    assert!(parsed["dirty_months"].as_array().is_some_and(|m| !m.is_empty()));
}

#[test]
fn test_scheduler_seed_then_tick_then_inspect() {
    let seed = run_cli(&["scheduler", "seed"]);
    assert_eq!(seed.2, 0, "scheduler seed failed: {}", seed.1);

    let tick = run_cli(&["scheduler", "tick"]);
    assert_eq!(tick.2, 0, "scheduler tick failed: {}", tick.1);

    let inspect = run_cli(&["scheduler", "inspect"]);
    assert_eq!(inspect.2, 0, "scheduler inspect failed: {}", inspect.1);
    let parsed: serde_json::Value = serde_json::from_str(&inspect.0).expect("not json");
    assert!(parsed.as_array().is_some());
}

#[test]
fn test_config_set_then_get_round_trips() {
    let set = run_cli(&["config", "set", "tick_interval_secs", "45"]);
    assert_eq!(set.2, 0, "config set failed: {}", set.1);

    let get = run_cli(&["config", "get", "tick_interval_secs"]);
    assert_eq!(get.2, 0, "config get failed: {}", get.1);
    assert!(get.0.trim() == "45");
}

#[test]
fn test_config_list_is_json() {
    let output = run_cli(&["config", "list"]);
    assert_eq!(output.2, 0, "config list failed: {}", output.1);
    let _: serde_json::Value = serde_json::from_str(&output.0).expect("not json");
}

#[test]
fn test_config_reset() {
    let output = run_cli(&["config", "reset"]);
    assert_eq!(output.2, 0, "config reset failed: {}", output.1);
}

#[test]
fn test_config_get_unknown_key_fails() {
    let output = run_cli(&["config", "get", "not_a_real_key"]);
    assert_ne!(output.2, 0, "expected failure for unknown config key");
}
