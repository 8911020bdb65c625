//! Ollama chat adapter.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Generator, Prompt};
use crate::config::LlmConfig;
use crate::embedding::OLLAMA_BASE_URL;
use crate::error::RagError;
use crate::http::{build_client, JsonPost};

const SERVICE: &str = "Ollama chat";

/// Calls `POST /api/chat` with `stream: false` on a local Ollama instance.
pub struct OllamaGenerator {
    model: String,
    temperature: f32,
    endpoint: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let base = config.url.as_deref().unwrap_or(OLLAMA_BASE_URL);
        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            endpoint: format!("{}/api/chat", base.trim_end_matches('/')),
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "options": { "temperature": self.temperature },
            "stream": false,
        });
        let post = JsonPost {
            service: SERVICE,
            url: &self.endpoint,
            bearer: None,
            max_retries: self.max_retries,
        };
        let json = post.send(&self.client, &body).await?;
        parse_ollama_chat(&json)
    }
}

fn parse_ollama_chat(json: &Value) -> Result<String, RagError> {
    json.get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: missing message.content"))
}
