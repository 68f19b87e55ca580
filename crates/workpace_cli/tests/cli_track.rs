use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("workpace-{nanos}-{file_name}"))
}

fn write_store(path: &Path, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_workpace");
    Command::new(exe)
        .args(args)
        .env("WORKPACE_STORE_PATH", store_path)
        .env("WORKPACE_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run workpace")
}

fn task(id: &str, status: &str, actual: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "owner_id": "local",
        "title": format!("title of {id}"),
        "status": status,
        "planned_time": 60,
        "actual_time": actual,
        "created_at": "2025-12-20T00:00:00Z"
    })
}

#[test]
fn track_log_adds_minutes() {
    let store_path = temp_path("cli-track-log.json");
    write_store(&store_path, serde_json::json!([task("task-1", "pending", 10)]));

    let output = run(&store_path, &["track", "log", "task-1", "25"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("total 35m"));

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["actual_time"], 35);
}

#[test]
fn track_start_records_timer_and_stop_clears_it() {
    let store_path = temp_path("cli-track-start.json");
    write_store(&store_path, serde_json::json!([task("task-1", "pending", 0)]));

    let started = run(&store_path, &["track", "start", "task-1"]);
    assert!(started.status.success());
    let running = read_store(&store_path);
    let started_at = running["tasks"][0]["tracking_started_at"]
        .as_str()
        .expect("tracking_started_at string")
        .to_string();
    OffsetDateTime::parse(&started_at, &Rfc3339).expect("tracking_started_at rfc3339");

    let stopped = run(&store_path, &["track", "stop", "task-1"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(stopped.status.success());
    assert!(stored["tasks"][0]["tracking_started_at"].is_null());
    assert_eq!(stored["tasks"][0]["actual_time"], 0);
}

#[test]
fn track_stop_credits_elapsed_minutes() {
    let store_path = temp_path("cli-track-elapsed.json");
    let started_at = (OffsetDateTime::now_utc() - time::Duration::minutes(30))
        .format(&Rfc3339)
        .unwrap();
    let mut running = task("task-1", "in-progress", 5);
    running["tracking_started_at"] = serde_json::Value::String(started_at);
    write_store(&store_path, serde_json::json!([running]));

    let output = run(&store_path, &["track", "stop", "task-1", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let minutes = outcome["minutes"].as_u64().unwrap();
    assert!((30..=31).contains(&minutes));
    assert_eq!(outcome["task"]["actual_time"].as_u64().unwrap(), 5 + minutes);
}

#[test]
fn track_start_rejects_completed_task() {
    let store_path = temp_path("cli-track-completed.json");
    write_store(&store_path, serde_json::json!([task("task-1", "completed", 60)]));

    let output = run(&store_path, &["track", "start", "task-1"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn track_start_switches_the_running_timer() {
    let store_path = temp_path("cli-track-switch.json");
    write_store(
        &store_path,
        serde_json::json!([task("task-1", "pending", 0), task("task-2", "pending", 0)]),
    );

    assert!(run(&store_path, &["track", "start", "task-1"]).status.success());
    let output = run(&store_path, &["track", "start", "task-2"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopped tracking: title of task-1"));
    assert!(stored["tasks"][0]["tracking_started_at"].is_null());
    assert!(stored["tasks"][1]["tracking_started_at"].is_string());
}
