use super::{CompletionRequest, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub struct GeminiClient {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            model,
            api_key,
            base_url,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<LlmResponse, LlmError> {
        let mut generation = json!({
            "temperature": req.temperature,
            "maxOutputTokens": req.max_output_tokens,
        });
        if req.json_output {
            generation["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
            "generationConfig": generation,
        });
        if !req.system.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": req.system }] });
        }

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: "gemini",
                status: status.as_u16(),
                body: error_text,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let text = json
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                let reason = json
                    .pointer("/candidates/0/finishReason")
                    .and_then(|v| v.as_str())
                    .unwrap_or("no candidates");
                LlmError::MissingContent(reason.to_string())
            })?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: "gemini".to_string(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_shape() {
        let c = GeminiClient::new(
            "gemini-2.5-flash".into(),
            "k".into(),
            "https://generativelanguage.googleapis.com/v1beta/".into(),
            Duration::from_secs(5),
        );
        assert_eq!(
            c.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
