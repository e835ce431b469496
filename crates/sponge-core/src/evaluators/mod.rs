use crate::model::{CodeEval, ConvEval, ConversationTurn};
use async_trait::async_trait;

pub mod code;
pub mod conversation;
pub mod parse;
pub mod prompts;

pub use code::LlmCodeAnalyzer;
pub use conversation::LlmConversationEvaluator;

/// Scores the conversation transcript. Never fails past this boundary:
/// any internal failure is reported as `None`.
#[async_trait]
pub trait ConversationEvaluator: Send + Sync {
    async fn evaluate_conversation(&self, turns: &[ConversationTurn]) -> Option<ConvEval>;
}

/// Scores the submitted code blob. `None` on any internal failure.
#[async_trait]
pub trait CodeAnalyzer: Send + Sync {
    async fn analyze_code(&self, blob: &str) -> Option<CodeEval>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 512,
        }
    }
}
