use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;

const SYSTEM_MESSAGE: &str = "You write clear, professional workplace health and safety inspection reports.";

/// Turns an assembled prompt into report text.
pub trait ReportGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionsGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl ChatCompletionsGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_MESSAGE },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }
}

impl ReportGenerator for ChatCompletionsGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending report prompt");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout { timeout_secs: self.config.timeout_secs }
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Status { status: status.as_u16(), body });
        }

        let val: Value = resp
            .json()
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        extract_content(&val)
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions response.
pub fn extract_content(val: &Value) -> Result<String, GenerationError> {
    val.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GenerationError::MalformedResponse("missing choices[0].message.content".to_string()))
}
