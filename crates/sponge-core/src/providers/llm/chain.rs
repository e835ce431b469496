use super::{CompletionRequest, ErrorClass, LlmClient, LlmError, LlmResponse};
use std::sync::Arc;

/// Tries each backend in order.
///
/// A retryable (quota) error moves on to the next backend; a terminal error
/// aborts the chain. `Ok(None)` means every backend was exhausted.
pub async fn complete_with_fallback(
    backends: &[Arc<dyn LlmClient>],
    req: &CompletionRequest,
) -> Result<Option<LlmResponse>, LlmError> {
    for backend in backends {
        match backend.complete(req).await {
            Ok(resp) => return Ok(Some(resp)),
            Err(e) if e.class() == ErrorClass::Retryable => {
                tracing::warn!(
                    event = "sponge.llm.quota_exhausted",
                    provider = backend.provider_name(),
                    model = backend.model(),
                    "quota exhausted, trying next backend"
                );
            }
            Err(e) => return Err(e),
        }
    }
    tracing::error!(
        event = "sponge.llm.chain_exhausted",
        backends = backends.len(),
        "all backends in fallback chain exhausted"
    );
    Ok(None)
}
