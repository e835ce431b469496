use super::{CompletionRequest, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted backend. Queued replies are served first, then `fallback`.
pub struct FakeClient {
    model: String,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(model: impl Into<String>, text: impl Into<String>) -> Self {
        let mut c = Self::new(model);
        c.fallback = Some(text.into());
        c
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_error(self, err: LlmError) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, item: Result<String, LlmError>) {
        let mut q = self.script.lock().unwrap_or_else(|p| p.into_inner());
        q.push_back(item);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, _req: &CompletionRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut q = self.script.lock().unwrap_or_else(|p| p.into_inner());
            q.pop_front()
        };
        let text = match next {
            Some(item) => item?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::Other("fake client script exhausted".into()))?,
        };
        Ok(LlmResponse {
            text,
            provider: "fake".into(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
