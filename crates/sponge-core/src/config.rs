use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpongeConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub tests: TestCatalog,
    #[serde(default)]
    pub evaluators: EvaluatorConfig,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Untouched reference project copied into every sandbox.
    pub reference_project: PathBuf,
    /// Directory name of the project copy inside the sandbox root.
    pub project_dir: String,
    pub copy_excludes: Vec<String>,
    /// File written at the sandbox root that isolates external services.
    pub fixture_name: String,
    /// Fixture source file. The built-in in-memory store fixture is used when unset.
    pub fixture_source: Option<PathBuf>,
    pub visible_suite: PathBuf,
    pub hidden_suite: Option<PathBuf>,
    pub program: String,
    /// Argument templates; see `sandbox::command` for placeholders.
    pub args: Vec<String>,
    /// Project-relative directories excluded from test discovery.
    pub ignore_dirs: Vec<String>,
    pub artifact_name: String,
    pub timeout_secs: u64,
    pub overlay_env: String,
    pub search_path_env: String,
    /// Project-relative entries prepended to the search path variable.
    pub search_path: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            reference_project: PathBuf::from("rq-v1.0"),
            project_dir: "rq-v1.0".into(),
            copy_excludes: vec![".git".into(), "__pycache__".into()],
            fixture_name: "conftest.py".into(),
            fixture_source: None,
            visible_suite: PathBuf::from("tests/test_submission.py"),
            hidden_suite: Some(PathBuf::from("tests/test_hidden.py")),
            program: "python".into(),
            args: [
                "-m",
                "pytest",
                "{suites}",
                "--junitxml={artifact}",
                "-q",
                "--no-header",
                "--ignore={ignore}",
                "--rootdir={root}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignore_dirs: vec!["tests".into()],
            artifact_name: "results.xml".into(),
            timeout_secs: 45,
            overlay_env: "RQ_CODEBASE_PATH".into(),
            search_path_env: "PYTHONPATH".into(),
            search_path: vec![".".into(), "tests".into()],
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,
    #[serde(default)]
    pub core: bool,
}

impl TestSpec {
    fn new(name: &str, core: bool) -> Self {
        Self {
            name: name.to_string(),
            core,
        }
    }
}

/// Canonical, ordered set of expected test names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCatalog {
    pub visible: Vec<TestSpec>,
    pub hidden: Vec<TestSpec>,
}

impl Default for TestCatalog {
    fn default() -> Self {
        let visible = [
            ("test_enqueue_in_exists", true),
            ("test_enqueue_at_exists", true),
            ("test_existing_enqueue_unchanged", true),
            ("test_enqueue_in_returns_job", false),
            ("test_enqueue_at_returns_job", false),
            ("test_scheduled_job_not_in_queue_immediately", false),
            ("test_scheduled_job_in_scheduled_registry", false),
            ("test_enqueue_at_past_datetime", false),
            ("test_enqueue_in_zero_delay", false),
            ("test_worker_moves_ready_jobs", false),
            ("test_multiple_scheduled_jobs_ordering", false),
            ("test_job_status_lifecycle", false),
        ];
        let hidden = [
            "test_enqueue_in_negative_delay",
            "test_scheduled_job_preserves_args_kwargs",
            "test_rapid_successive_scheduling",
            "test_enqueue_in_preserves_enqueue_signature",
            "test_worker_handles_mixed_scheduled_and_regular",
            "test_same_time_scheduling",
            "test_scheduled_job_exception_handling",
            "test_enqueue_at_with_echo_kwargs",
        ];
        Self {
            visible: visible
                .iter()
                .map(|(n, core)| TestSpec::new(n, *core))
                .collect(),
            hidden: hidden.iter().map(|n| TestSpec::new(n, false)).collect(),
        }
    }
}

impl TestCatalog {
    pub fn expected(&self, include_hidden: bool) -> Vec<TestSpec> {
        let mut out = self.visible.clone();
        if include_hidden {
            out.extend(self.hidden.iter().cloned());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    /// Evaluators are disabled; scoring runs metric-only.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub provider: ProviderKind,
    /// Backend chain, tried in order.
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub api_key_env: String,
    /// Env var whose value, when set, is tried before `models`.
    pub model_env: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub transcript_truncate: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            models: vec![
                "gemini-2.5-pro".into(),
                "gemini-2.5-flash".into(),
                "gemini-2.0-flash".into(),
            ],
            temperature: 0.2,
            max_output_tokens: 512,
            api_key_env: "GEMINI_API_KEY".into(),
            model_env: "GEMINI_MODEL".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_secs: 60,
            transcript_truncate: 800,
        }
    }
}

impl EvaluatorConfig {
    /// Ordered, de-duplicated model chain with an optional primary override first.
    pub fn model_chain(&self, primary: Option<&str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let candidates = primary
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim().to_string())
            .into_iter()
            .chain(self.models.iter().cloned());
        for m in candidates {
            if !out.contains(&m) {
                out.push(m);
            }
        }
        out
    }
}

/// Term lists used by the behavioral heuristics. Matching is lowercase substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Files and identifiers of the reference project.
    pub grounding: Vec<String>,
    pub tradeoff: Vec<String>,
    pub edge_case: Vec<String>,
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            grounding: terms(&[
                "worker.py",
                "queue.py",
                "job.py",
                "registry.py",
                "timeouts.py",
                "connections.py",
                "exceptions.py",
                "utils.py",
                "serializers.py",
                "enqueue",
                "dequeue",
                "blpop",
                "hset",
                "lpush",
                "rpush",
                "enqueue_in",
                "enqueue_at",
                "dequeue_timeout",
                "baseworker",
                "simpleworker",
                "worker",
                "baseregistry",
                "startedregistry",
                "finishedregistry",
                "failedregistry",
                "deferredregistry",
                "scheduledregistry",
                "job.create",
                "job.fetch",
                "job.restore",
                "sorted set",
                "ttl",
                "heartbeat",
                "work horse",
                "workhorse",
                "register_birth",
                "register_death",
                "clean_registries",
                "dequeue_job_and_maintain_ttl",
                "execute_job",
            ]),
            tradeoff: terms(&[
                "tradeoff",
                "trade-off",
                "instead of",
                "alternatively",
                "however",
                "downside",
                "upside",
                "pros",
                "cons",
                "better",
                "worse",
                "simpler",
                "more complex",
                "overhead",
                "performance",
                "memory",
                "time complexity",
                "space complexity",
                "o(",
                "big o",
            ]),
            edge_case: terms(&[
                "edge case",
                "edge-case",
                "boundary",
                "corner case",
                "corner-case",
                "empty",
                "none",
                "null",
                "zero",
                "negative",
                "overflow",
                "fail",
                "error",
                "exception",
                "invalid",
                "missing",
                "timeout",
                "retry",
                "duplicate",
            ]),
        }
    }
}

impl SpongeConfig {
    /// Applies `SPONGE_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SPONGE_EVAL_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.evaluators.timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SPONGE_SANDBOX_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.sandbox.timeout_secs = n;
            }
        }
    }
}

pub fn load_config(path: &Path, strict: bool) -> Result<SpongeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);

    let mut cfg: SpongeConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                meaningful_unknowns,
                path.display()
            )));
        }
        tracing::warn!(
            event = "sponge.config.unknown_fields",
            fields = ?meaningful_unknowns,
            file = %path.display(),
            "ignoring unknown config fields"
        );
    }

    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    validate(&cfg)?;
    normalize_paths(&mut cfg, path);
    Ok(cfg)
}

fn validate(cfg: &SpongeConfig) -> Result<(), ConfigError> {
    if cfg.tests.visible.is_empty() {
        return Err(ConfigError("tests.visible must list at least one test".into()));
    }
    let mut seen = std::collections::HashSet::new();
    for t in cfg.tests.visible.iter().chain(cfg.tests.hidden.iter()) {
        if !seen.insert(t.name.as_str()) {
            return Err(ConfigError(format!("duplicate test name: {}", t.name)));
        }
    }
    if cfg.sandbox.timeout_secs == 0 {
        return Err(ConfigError("sandbox.timeout_secs must be positive".into()));
    }
    if cfg.sandbox.hidden_suite.is_none() && !cfg.tests.hidden.is_empty() {
        return Err(ConfigError(
            "tests.hidden lists tests but sandbox.hidden_suite is not set".into(),
        ));
    }
    if cfg.sandbox.program.trim().is_empty() {
        return Err(ConfigError("sandbox.program must not be empty".into()));
    }
    let project = Path::new(&cfg.sandbox.project_dir);
    if cfg.sandbox.project_dir.is_empty()
        || project.is_absolute()
        || project.components().count() != 1
    {
        return Err(ConfigError(format!(
            "sandbox.project_dir must be a single directory name, got {:?}",
            cfg.sandbox.project_dir
        )));
    }
    if cfg.evaluators.provider == ProviderKind::Gemini && cfg.evaluators.models.is_empty() {
        return Err(ConfigError("evaluators.models must not be empty".into()));
    }
    Ok(())
}

fn normalize_paths(cfg: &mut SpongeConfig, config_path: &Path) {
    let r = path_resolver::PathResolver::new(config_path);
    r.resolve(&mut cfg.sandbox.reference_project);
    r.resolve_opt(&mut cfg.sandbox.fixture_source);
    r.resolve(&mut cfg.sandbox.visible_suite);
    r.resolve_opt(&mut cfg.sandbox.hidden_suite);
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"configVersion: 1
sandbox:
  reference_project: rq-v1.0
  visible_suite: tests/test_submission.py
  hidden_suite: tests/test_hidden.py
  timeout_secs: 45
tests:
  visible:
    - { name: test_enqueue_in_exists, core: true }
    - { name: test_enqueue_at_exists, core: true }
    - { name: test_existing_enqueue_unchanged, core: true }
    - { name: test_enqueue_in_returns_job }
  hidden:
    - { name: test_enqueue_in_negative_delay }
evaluators:
  provider: gemini
  models: [gemini-2.5-pro, gemini-2.5-flash, gemini-2.0-flash]
  timeout_secs: 60
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
