use sponge_core::config::{EvaluatorConfig, ProviderKind, SpongeConfig};
use sponge_core::engine::{SubmitService, Timeouts};
use sponge_core::evaluators::{GenerationSettings, LlmCodeAnalyzer, LlmConversationEvaluator};
use sponge_core::providers::llm::gemini::GeminiClient;
use sponge_core::providers::llm::LlmClient;
use sponge_core::sandbox::SandboxExecutor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::exit_codes;

/// Loads the config and applies environment overrides. A load failure is
/// reported here and mapped to the config-error exit code.
pub fn load(path: &Path, strict: bool) -> Result<SpongeConfig, i32> {
    match sponge_core::config::load_config(path, strict) {
        Ok(mut cfg) => {
            cfg.apply_env_overrides();
            Ok(cfg)
        }
        Err(e) => {
            eprintln!("{}", e);
            Err(exit_codes::CONFIG_ERROR)
        }
    }
}

/// Backend chain for the configured provider. The API key is read once here;
/// without it the chain is empty and both evaluators report absence.
pub fn build_backends(cfg: &EvaluatorConfig) -> Vec<Arc<dyn LlmClient>> {
    if cfg.provider == ProviderKind::None {
        return Vec::new();
    }
    let api_key = match std::env::var(&cfg.api_key_env) {
        Ok(k) if !k.trim().is_empty() => k,
        _ => {
            tracing::warn!(
                event = "sponge.eval.no_credentials",
                env = %cfg.api_key_env,
                "API key not set, evaluators disabled"
            );
            return Vec::new();
        }
    };
    let primary = std::env::var(&cfg.model_env).ok();
    let timeout = Duration::from_secs(cfg.timeout_secs);

    cfg.model_chain(primary.as_deref())
        .into_iter()
        .map(|model| {
            Arc::new(GeminiClient::new(
                model,
                api_key.clone(),
                cfg.base_url.clone(),
                timeout,
            )) as Arc<dyn LlmClient>
        })
        .collect()
}

pub fn build_service(cfg: &SpongeConfig) -> SubmitService {
    let backends = build_backends(&cfg.evaluators);
    let settings = GenerationSettings {
        temperature: cfg.evaluators.temperature,
        max_output_tokens: cfg.evaluators.max_output_tokens,
    };
    tracing::info!(
        event = "sponge.cli.wiring",
        backends = backends.len(),
        sandbox_timeout_secs = cfg.sandbox.timeout_secs,
    );

    SubmitService {
        conversation: Arc::new(LlmConversationEvaluator::new(
            backends.clone(),
            settings,
            cfg.evaluators.transcript_truncate,
        )),
        code: Arc::new(LlmCodeAnalyzer::new(backends, settings)),
        executor: Arc::new(SandboxExecutor::new(cfg.sandbox.clone(), cfg.tests.clone())),
        aggregator: sponge_metrics::default_aggregator(&cfg.vocabulary),
        timeouts: Timeouts::from_config(cfg),
    }
}
