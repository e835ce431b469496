use async_trait::async_trait;

pub mod chain;
pub mod fake;
pub mod gemini;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the backend for a JSON-only response body.
    pub json_output: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota or rate limit; the next backend in a chain may still succeed.
    Retryable,
    Terminal,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{provider} API error (status {status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response missing content: {0}")]
    MissingContent(String),
    #[error("{0}")]
    Other(String),
}

impl LlmError {
    pub fn class(&self) -> ErrorClass {
        let quota = match self {
            LlmError::Api { status, body, .. } => {
                *status == 429 || body.contains("RESOURCE_EXHAUSTED")
            }
            LlmError::Transport(msg) | LlmError::Other(msg) => {
                msg.contains("429") || msg.contains("RESOURCE_EXHAUSTED")
            }
            LlmError::MissingContent(_) => false,
        };
        if quota {
            ErrorClass::Retryable
        } else {
            ErrorClass::Terminal
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<LlmResponse, LlmError>;
    fn provider_name(&self) -> &'static str;
    fn model(&self) -> &str;
}
