#![cfg(unix)]

use sponge_core::config::{SandboxConfig, TestCatalog, TestSpec};
use sponge_core::overlay::Overlay;
use sponge_core::sandbox::{SandboxError, SandboxExecutor, TestExecutor};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PASS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites><testsuite name="pytest" tests="3">
  <testcase classname="test_submission" name="test_enqueue" time="0.01"/>
  <testcase classname="test_submission" name="test_retry" time="0.01">
    <failure message="assert 0 == 1">trace</failure>
  </testcase>
  <testcase classname="test_submission" name="test_unlisted" time="0.01"/>
</testsuite></testsuites>"#;

struct Fixture {
    _tmp: TempDir,
    reference: PathBuf,
    suite: PathBuf,
    mark: PathBuf,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let reference = tmp.path().join("ref");
    fs::create_dir_all(reference.join("pkg")).unwrap();
    fs::create_dir_all(reference.join("tests")).unwrap();
    fs::write(reference.join("pkg/queue.py"), "ORIGINAL = True\n").unwrap();
    fs::write(reference.join("tests/test_old.py"), "def test_old(): pass\n").unwrap();
    let suite = tmp.path().join("test_submission.py");
    fs::write(&suite, "def test_enqueue(): pass\n").unwrap();
    let mark = tmp.path().join("sandbox_root.txt");
    Fixture {
        reference,
        suite,
        mark,
        _tmp: tmp,
    }
}

fn catalog() -> TestCatalog {
    TestCatalog {
        visible: vec![
            TestSpec {
                name: "test_enqueue".into(),
                core: true,
            },
            TestSpec {
                name: "test_retry".into(),
                core: true,
            },
            TestSpec {
                name: "test_missing".into(),
                core: false,
            },
        ],
        hidden: vec![],
    }
}

/// `sh -c <script> sh <artifact> <project>`; the script sees `$1`/`$2`.
fn config(f: &Fixture, script: &str, timeout_secs: u64) -> SandboxConfig {
    let mut cfg = SandboxConfig {
        reference_project: f.reference.clone(),
        project_dir: "proj".into(),
        visible_suite: f.suite.clone(),
        hidden_suite: None,
        program: "sh".into(),
        args: vec![
            "-c".into(),
            format!("pwd > \"$SPONGE_MARK\"; {}", script),
            "sh".into(),
            "{artifact}".into(),
            "{project}".into(),
        ],
        timeout_secs,
        ..SandboxConfig::default()
    };
    cfg.env
        .insert("SPONGE_MARK".into(), f.mark.display().to_string());
    cfg.env.insert("PASS_XML".into(), PASS_XML.into());
    cfg
}

fn overlay() -> Overlay {
    Overlay::parse("// --- pkg/queue.py ---\nORIGINAL = False\n")
}

fn sandbox_root(f: &Fixture) -> PathBuf {
    PathBuf::from(fs::read_to_string(&f.mark).unwrap().trim())
}

fn assert_removed(path: &Path) {
    assert!(!path.exists(), "sandbox {} still exists", path.display());
}

#[tokio::test]
async fn test_artifact_yields_normalized_result() {
    let f = fixture();
    let cfg = config(&f, r#"printf '%s' "$PASS_XML" > "$1""#, 10);
    let exec = SandboxExecutor::new(cfg, catalog());

    let res = exec.run(&overlay(), false).await.expect("result");
    assert_eq!(res.total, 3);
    assert_eq!(res.passed, 1);
    assert_eq!(res.failed, 2);
    assert_eq!(res.pass_rate, Some(0.33));
    assert_eq!(res.results[1].error.as_deref(), Some("assert 0 == 1"));
    assert_eq!(res.results[2].error.as_deref(), Some("Test not found in output"));
    assert_eq!(res.core_failures, vec!["test_retry".to_string()]);

    assert_removed(&sandbox_root(&f));
}

#[tokio::test]
async fn test_overlay_and_environment_reach_subprocess() {
    let f = fixture();
    let script = r#"
        grep -q 'ORIGINAL = False' "$2/pkg/queue.py" || exit 0
        [ "$RQ_CODEBASE_PATH" = "$2" ] || exit 0
        [ -f conftest.py ] || exit 0
        [ -f test_submission.py ] || exit 0
        printf '%s' "$PASS_XML" > "$1"
    "#;
    let exec = SandboxExecutor::new(config(&f, script, 10), catalog());
    assert!(exec.run(&overlay(), false).await.is_some());
}

#[tokio::test]
async fn test_timeout_is_no_result() {
    let f = fixture();
    let exec = SandboxExecutor::new(config(&f, "sleep 30", 1), catalog());

    let err = exec.execute(&overlay(), false).await.unwrap_err();
    assert!(matches!(err, SandboxError::Timeout(1)));
    assert_removed(&sandbox_root(&f));
}

#[tokio::test]
async fn test_missing_artifact_is_no_result() {
    let f = fixture();
    let exec = SandboxExecutor::new(config(&f, "echo '1 passed'", 10), catalog());

    assert!(exec.run(&overlay(), false).await.is_none());
    let err = exec.execute(&overlay(), false).await.unwrap_err();
    assert!(matches!(err, SandboxError::MissingArtifact(_)));
    assert_removed(&sandbox_root(&f));
}

#[tokio::test]
async fn test_malformed_artifact_is_no_result() {
    let f = fixture();
    let exec = SandboxExecutor::new(
        config(&f, r#"printf '<testsuite><testcase name="a">' > "$1""#, 10),
        catalog(),
    );
    let err = exec.execute(&overlay(), false).await.unwrap_err();
    assert!(matches!(err, SandboxError::MalformedArtifact(_)));
    assert_removed(&sandbox_root(&f));
}

#[tokio::test]
async fn test_escaping_overlay_entry_is_not_written() {
    let f = fixture();
    let script = r#"
        [ -e "$2/../escape.py" ] && exit 0
        [ -f "$2/pkg/new.py" ] || exit 0
        printf '%s' "$PASS_XML" > "$1"
    "#;
    let exec = SandboxExecutor::new(config(&f, script, 10), catalog());
    let ov = Overlay::parse(
        "// --- ../escape.py ---\nimport os\n// --- pkg/new.py ---\nX = 1\n",
    );

    assert!(exec.run(&ov, false).await.is_some());
    assert!(!f.reference.parent().unwrap().join("escape.py").exists());
}

#[tokio::test]
async fn test_empty_overlay_is_skipped() {
    let f = fixture();
    let exec = SandboxExecutor::new(config(&f, "exit 0", 10), catalog());
    let err = exec.execute(&Overlay::default(), false).await.unwrap_err();
    assert!(matches!(err, SandboxError::EmptyOverlay));
    assert!(!f.mark.exists());
}
