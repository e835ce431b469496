use super::parse::parse_tolerant;
use super::prompts::CONVERSATION_SYSTEM_PROMPT;
use super::{ConversationEvaluator, GenerationSettings};
use crate::model::{ConvEval, ConversationTurn, Role};
use crate::providers::llm::chain::complete_with_fallback;
use crate::providers::llm::{CompletionRequest, LlmClient};
use async_trait::async_trait;
use std::sync::Arc;

const TRUNCATION_MARKER: &str = "... [truncated]";

pub struct LlmConversationEvaluator {
    backends: Vec<Arc<dyn LlmClient>>,
    settings: GenerationSettings,
    truncate_at: usize,
}

impl LlmConversationEvaluator {
    pub fn new(backends: Vec<Arc<dyn LlmClient>>, settings: GenerationSettings, truncate_at: usize) -> Self {
        Self {
            backends,
            settings,
            truncate_at,
        }
    }
}

/// Renders the conversation for the evaluator. Assistant turns longer than
/// `truncate_at` characters are cut.
pub fn format_transcript(turns: &[ConversationTurn], truncate_at: usize) -> String {
    turns
        .iter()
        .map(|t| match t.role {
            Role::User => format!("DEVELOPER: {}", t.content),
            Role::Assistant => {
                if t.content.chars().count() > truncate_at {
                    let head: String = t.content.chars().take(truncate_at).collect();
                    format!("AI ASSISTANT: {}{}", head, TRUNCATION_MARKER)
                } else {
                    format!("AI ASSISTANT: {}", t.content)
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl ConversationEvaluator for LlmConversationEvaluator {
    async fn evaluate_conversation(&self, turns: &[ConversationTurn]) -> Option<ConvEval> {
        if !turns.iter().any(|t| t.role == Role::User) {
            return None;
        }
        let transcript = format_transcript(turns, self.truncate_at);
        let req = CompletionRequest {
            system: CONVERSATION_SYSTEM_PROMPT.to_string(),
            prompt: format!("Here is the full conversation to evaluate:\n\n{}", transcript),
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
            json_output: true,
        };

        let resp = match complete_with_fallback(&self.backends, &req).await {
            Ok(Some(resp)) => resp,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    event = "sponge.eval.conversation_failed",
                    error = %e,
                    "conversation evaluation failed, falling back to metrics"
                );
                return None;
            }
        };

        let Some(data) = parse_tolerant(&resp.text) else {
            tracing::warn!(
                event = "sponge.eval.unparseable",
                evaluator = "conversation",
                model = %resp.model,
                "could not parse JSON from response"
            );
            return None;
        };
        match serde_json::from_value::<ConvEval>(data) {
            Ok(eval) => Some(eval.clamped()),
            Err(e) => {
                tracing::warn!(
                    event = "sponge.eval.unparseable",
                    evaluator = "conversation",
                    error = %e,
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::fake::FakeClient;
    use crate::providers::llm::LlmError;

    fn turns() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn {
                role: Role::User,
                content: "How does enqueue_call in queue.py push jobs?".into(),
            },
            ConversationTurn {
                role: Role::Assistant,
                content: "x".repeat(900),
            },
        ]
    }

    #[test]
    fn test_transcript_truncates_long_assistant_turns() {
        let t = format_transcript(&turns(), 800);
        let parts: Vec<&str> = t.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("DEVELOPER: How does"));
        assert!(parts[1].ends_with("... [truncated]"));
        assert_eq!(
            parts[1].len(),
            "AI ASSISTANT: ".len() + 800 + TRUNCATION_MARKER.len()
        );
    }

    #[tokio::test]
    async fn test_parses_and_clamps_reply() {
        let client = Arc::new(FakeClient::always(
            "m",
            "```json\n{\"a1_understanding\": 9, \"d2_tradeoffs\": 3.5, \"interpretation\": \" solid \"}\n```",
        ));
        let eval = LlmConversationEvaluator::new(vec![client as Arc<dyn LlmClient>], GenerationSettings::default(), 800);
        let res = eval.evaluate_conversation(&turns()).await.unwrap();
        assert_eq!(res.a1_understanding, 6.0);
        assert_eq!(res.d2_tradeoffs, 3.5);
        assert_eq!(res.interpretation, "solid");
    }

    #[tokio::test]
    async fn test_no_user_turns_skips_backend() {
        let client = Arc::new(FakeClient::always("m", "{}"));
        let eval = LlmConversationEvaluator::new(vec![client.clone() as Arc<dyn LlmClient>], GenerationSettings::default(), 800);
        let only_ai = vec![ConversationTurn {
            role: Role::Assistant,
            content: "hello".into(),
        }];
        assert!(eval.evaluate_conversation(&only_ai).await.is_none());
        assert!(eval.evaluate_conversation(&[]).await.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let garbage = Arc::new(FakeClient::always("m", "I cannot help with that"));
        let eval = LlmConversationEvaluator::new(vec![garbage as Arc<dyn LlmClient>], GenerationSettings::default(), 800);
        assert!(eval.evaluate_conversation(&turns()).await.is_none());

        let broken = Arc::new(FakeClient::new("m").with_error(LlmError::Api {
            provider: "fake",
            status: 403,
            body: "forbidden".into(),
        }));
        let eval = LlmConversationEvaluator::new(vec![broken as Arc<dyn LlmClient>], GenerationSettings::default(), 800);
        assert!(eval.evaluate_conversation(&turns()).await.is_none());

        let eval = LlmConversationEvaluator::new(vec![], GenerationSettings::default(), 800);
        assert!(eval.evaluate_conversation(&turns()).await.is_none());
    }
}
