//! OpenAI chat completions adapter.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Generator, Prompt};
use crate::config::LlmConfig;
use crate::embedding::{openai_api_key, OPENAI_BASE_URL};
use crate::error::RagError;
use crate::http::{build_client, JsonPost};

const SERVICE: &str = "OpenAI chat";

pub struct OpenAIGenerator {
    model: String,
    temperature: f32,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIGenerator {
    /// Create a generator using `OPENAI_API_KEY` from the environment.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Self::with_api_key(config, openai_api_key()?)
    }

    pub fn with_api_key(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let base = config.url.as_deref().unwrap_or(OPENAI_BASE_URL);
        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            api_key: api_key.into(),
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }

    fn request_body(&self, prompt: &Prompt) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": self.temperature,
            "stream": false,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
        tracing::debug!(url = %self.endpoint, model = %self.model, "sending chat completion request");
        let post = JsonPost {
            service: SERVICE,
            url: &self.endpoint,
            bearer: Some(&self.api_key),
            max_retries: self.max_retries,
        };
        let json = post.send(&self.client, &self.request_body(prompt)).await?;
        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content`. A `null` content (refusal or
/// tool call) reads as an empty reply.
fn parse_chat_response(json: &Value) -> Result<String, RagError> {
    let message = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: missing choices[0].message"))?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string())
}
