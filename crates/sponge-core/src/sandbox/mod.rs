use crate::config::{SandboxConfig, TestCatalog};
use crate::model::TestSuiteResult;
use crate::normalize::normalize;
use crate::overlay::Overlay;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

pub mod artifact;
pub mod command;
pub mod fixture;
pub mod materialize;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("overlay contains no files")]
    EmptyOverlay,
    #[error("no expected tests configured")]
    NoExpectedTests,
    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to copy reference project: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("test run exceeded {0}s")]
    Timeout(u64),
    #[error("result artifact missing: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("malformed result artifact: {0}")]
    MalformedArtifact(String),
    #[error("sandbox task failed: {0}")]
    Task(String),
}

/// Runs the fixed test suites against a candidate overlay.
///
/// `None` means "no result": the run timed out, crashed, or produced no
/// readable artifact. It is never used for "ran and everything failed".
#[async_trait]
pub trait TestExecutor: Send + Sync {
    async fn run(&self, overlay: &Overlay, include_hidden: bool) -> Option<TestSuiteResult>;
}

pub struct SandboxExecutor {
    cfg: SandboxConfig,
    catalog: TestCatalog,
}

impl SandboxExecutor {
    pub fn new(cfg: SandboxConfig, catalog: TestCatalog) -> Self {
        Self { cfg, catalog }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.cfg
    }

    /// One isolated, at-most-once run. The sandbox directory is removed on
    /// every path out of this function.
    pub async fn execute(
        &self,
        overlay: &Overlay,
        include_hidden: bool,
    ) -> Result<TestSuiteResult, SandboxError> {
        if overlay.is_empty() {
            return Err(SandboxError::EmptyOverlay);
        }
        let expected = self.catalog.expected(include_hidden);
        if expected.is_empty() {
            return Err(SandboxError::NoExpectedTests);
        }

        let cfg = self.cfg.clone();
        let ov = overlay.clone();
        let prepared = tokio::task::spawn_blocking(move || {
            materialize::prepare(&cfg, &ov, include_hidden)
        })
        .await
        .map_err(|e| SandboxError::Task(e.to_string()))??;

        tracing::debug!(
            root = %prepared.root().display(),
            files = overlay.len(),
            rejected = prepared.rejected.len(),
            include_hidden,
            "sandbox prepared"
        );

        let args = command::expand_args(
            &self.cfg.args,
            &command::Placeholders {
                root: prepared.root(),
                project: &prepared.project,
                artifact: &prepared.artifact,
                suites: &prepared.suites,
                ignores: &prepared.ignores,
            },
        );

        let mut search = Vec::new();
        for entry in &self.cfg.search_path {
            search.push(prepared.project.join(entry));
        }
        if let Some(existing) = std::env::var_os(&self.cfg.search_path_env) {
            search.extend(std::env::split_paths(&existing));
        }
        let search = std::env::join_paths(search).map_err(|e| {
            SandboxError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let start = Instant::now();
        let child = Command::new(&self.cfg.program)
            .args(&args)
            .current_dir(prepared.root())
            .env(&self.cfg.overlay_env, &prepared.project)
            .env(&self.cfg.search_path_env, search)
            .envs(&self.cfg.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let timeout_secs = self.cfg.timeout_secs;
        match tokio::time::timeout(Duration::from_secs(timeout_secs), child).await {
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::debug!(
                    exit_code = output.status.code().unwrap_or(-1),
                    duration_ms = start.elapsed().as_millis() as u64,
                    stderr = %truncate(&stderr, 2000),
                    "test subprocess finished"
                );
            }
            Ok(Err(source)) => {
                return Err(SandboxError::Spawn {
                    program: self.cfg.program.clone(),
                    source,
                })
            }
            Err(_) => return Err(SandboxError::Timeout(timeout_secs)),
        }

        if !prepared.artifact.exists() {
            return Err(SandboxError::MissingArtifact(prepared.artifact.clone()));
        }
        let xml = tokio::fs::read_to_string(&prepared.artifact).await?;
        let raw = artifact::parse_junit(&xml)?;

        let result = normalize(&raw, &expected).ok_or(SandboxError::NoExpectedTests)?;

        if let Err(e) = prepared.dir.close() {
            tracing::warn!(event = "sponge.sandbox.cleanup_failed", error = %e);
        }
        Ok(result)
    }
}

#[async_trait]
impl TestExecutor for SandboxExecutor {
    async fn run(&self, overlay: &Overlay, include_hidden: bool) -> Option<TestSuiteResult> {
        match self.execute(overlay, include_hidden).await {
            Ok(res) => {
                tracing::info!(
                    event = "sponge.sandbox.completed",
                    total = res.total,
                    passed = res.passed,
                    core_failures = res.core_failures.len(),
                    include_hidden,
                );
                Some(res)
            }
            Err(SandboxError::EmptyOverlay) => {
                tracing::info!(event = "sponge.sandbox.skipped", reason = "empty overlay");
                None
            }
            Err(e) => {
                tracing::warn!(
                    event = "sponge.sandbox.no_result",
                    reason = %e,
                    include_hidden,
                    "sandbox run produced no result"
                );
                None
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
