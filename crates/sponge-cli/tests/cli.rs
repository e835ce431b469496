use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn sponge() -> Command {
    let mut cmd = Command::cargo_bin("sponge").unwrap();
    cmd.env("SPONGE_LOG", "off");
    cmd
}

#[test]
fn test_version_prints_package_version() {
    sponge()
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_parse_emits_files_as_json() {
    let dir = TempDir::new().unwrap();
    let overlay = dir.path().join("answer.txt");
    fs::write(
        &overlay,
        "// --- rq/queue.py ---\ndef enqueue_in():\n    pass\n// --- rq/job.py ---\nX = 1\n",
    )
    .unwrap();

    let out = sponge()
        .args(["parse", "--format", "json", "--overlay"])
        .arg(&overlay)
        .output()
        .unwrap();
    assert!(out.status.success());

    let files: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(files["rq/job.py"], "X = 1\n");
    assert_eq!(files["rq/queue.py"], "def enqueue_in():\n    pass");
}

#[test]
fn test_parse_without_markers_is_nothing_to_evaluate() {
    let dir = TempDir::new().unwrap();
    let overlay = dir.path().join("answer.txt");
    fs::write(&overlay, "just some prose, no files").unwrap();

    sponge()
        .args(["parse", "--overlay"])
        .arg(&overlay)
        .assert()
        .code(1)
        .stderr(contains("nothing to evaluate"));
}

#[test]
fn test_init_writes_loadable_sample_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("sponge.yaml");

    sponge().args(["init", "--config"]).arg(&config).assert().success();
    let cfg = sponge_core::config::load_config(&config, true).unwrap();
    assert_eq!(cfg.tests.visible.len(), 4);

    sponge()
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stderr(contains("already exists"));
}

#[test]
fn test_run_tests_with_missing_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    let overlay = dir.path().join("answer.txt");
    fs::write(&overlay, "// --- a.py ---\nprint(1)\n").unwrap();

    sponge()
        .args(["run-tests", "--config"])
        .arg(dir.path().join("missing.yaml"))
        .arg("--overlay")
        .arg(&overlay)
        .assert()
        .code(2)
        .stderr(contains("config error"));
}

#[test]
fn test_score_empty_session_applies_never_executed_penalty() {
    let dir = TempDir::new().unwrap();
    let session = dir.path().join("session.json");
    fs::write(
        &session,
        r#"{"session_id": "s-empty", "started_at": "2026-01-05T10:00:00Z"}"#,
    )
    .unwrap();

    let out = sponge()
        .args(["score", "--session"])
        .arg(&session)
        .output()
        .unwrap();
    assert!(out.status.success());

    let score: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(score["total_score"], 0);
    assert_eq!(score["penalty_detail"]["p2_no_run"], -10);
    assert_eq!(score["badge"], "Just Vibing");
}

#[test]
fn test_score_reads_supplied_test_results() {
    let dir = TempDir::new().unwrap();
    let session = dir.path().join("session.json");
    let results = dir.path().join("results.json");
    fs::write(
        &session,
        r#"{
  "id": "s-1",
  "started_at": "2026-01-05T10:00:00Z",
  "events": [
    {"event": "file_open", "file": "rq/queue.py", "ts": 1767607205000},
    {"event": "test_run", "ts": 1767607400000}
  ],
  "conversation": [
    {"role": "user", "content": "How does enqueue_call work in queue.py?"},
    {"role": "assistant", "content": "It builds a Job and pushes it."}
  ]
}"#,
    )
    .unwrap();
    fs::write(
        &results,
        r#"{
  "total": 2, "passed": 1, "failed": 1, "pass_rate": 0.5,
  "results": [
    {"name": "test_enqueue_in_exists", "passed": false, "error": "AssertionError", "is_core": true},
    {"name": "test_enqueue_in_returns_job", "passed": true}
  ],
  "core_failures": ["test_enqueue_in_exists"]
}"#,
    )
    .unwrap();

    let out = sponge()
        .args(["score", "--session"])
        .arg(&session)
        .arg("--test-results")
        .arg(&results)
        .output()
        .unwrap();
    assert!(out.status.success());

    let score: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(score["penalty_detail"]["p2_no_run"], 0);
    assert_eq!(score["penalty_detail"]["p3_critical_miss"], -10);
    assert_eq!(score["test_suite"]["core_failures"][0], "test_enqueue_in_exists");
}
