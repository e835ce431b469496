use super::parse::parse_tolerant;
use super::prompts::CODE_SYSTEM_PROMPT;
use super::{CodeAnalyzer, GenerationSettings};
use crate::model::CodeEval;
use crate::providers::llm::chain::complete_with_fallback;
use crate::providers::llm::{CompletionRequest, LlmClient};
use async_trait::async_trait;
use std::sync::Arc;

pub struct LlmCodeAnalyzer {
    backends: Vec<Arc<dyn LlmClient>>,
    settings: GenerationSettings,
}

impl LlmCodeAnalyzer {
    pub fn new(backends: Vec<Arc<dyn LlmClient>>, settings: GenerationSettings) -> Self {
        Self { backends, settings }
    }
}

#[async_trait]
impl CodeAnalyzer for LlmCodeAnalyzer {
    async fn analyze_code(&self, blob: &str) -> Option<CodeEval> {
        if blob.trim().is_empty() {
            return None;
        }
        let req = CompletionRequest {
            system: CODE_SYSTEM_PROMPT.to_string(),
            prompt: format!("Here is the developer's submitted code:\n\n{}", blob),
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
            json_output: true,
        };

        let resp = match complete_with_fallback(&self.backends, &req).await {
            Ok(Some(resp)) => resp,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    event = "sponge.eval.code_failed",
                    error = %e,
                    "code analysis failed, falling back to defaults"
                );
                return None;
            }
        };

        let data = parse_tolerant(&resp.text)?;
        match serde_json::from_value::<CodeEval>(data) {
            Ok(eval) => Some(eval.clamped()),
            Err(e) => {
                tracing::warn!(event = "sponge.eval.unparseable", evaluator = "code", error = %e);
                None
            }
        }
    }
}
