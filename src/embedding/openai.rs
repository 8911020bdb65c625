//! OpenAI embeddings adapter.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{check_vectors, resolve_dims, resolve_model, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::RagError;
use crate::http::{build_client, JsonPost};

const SERVICE: &str = "OpenAI embeddings";
pub(crate) const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Read `OPENAI_API_KEY`; unset or blank is a configuration error.
pub(crate) fn openai_api_key() -> Result<String, RagError> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(RagError::Configuration(
            "OPENAI_API_KEY environment variable not set".to_string(),
        )),
    }
}

/// Embedding provider using the OpenAI API.
///
/// Calls `POST {url}/embeddings` with the configured model. The API key is
/// read from `OPENAI_API_KEY` when the provider is created; `url` may point
/// at any OpenAI-compatible gateway.
pub struct OpenAIEmbedder {
    model: String,
    dims: usize,
    endpoint: String,
    api_key: String,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIEmbedder {
    /// Create a provider from configuration and the environment.
    ///
    /// # Errors
    ///
    /// Fails if `OPENAI_API_KEY` is not set or the model has no known size.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Self::with_api_key(config, openai_api_key()?)
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: &EmbeddingConfig, api_key: impl Into<String>) -> Result<Self> {
        let base = config.url.as_deref().unwrap_or(OPENAI_BASE_URL);
        Ok(Self {
            model: resolve_model(config)?,
            dims: resolve_dims(config)?,
            endpoint: format!("{}/embeddings", base.trim_end_matches('/')),
            api_key: api_key.into(),
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        let post = JsonPost {
            service: SERVICE,
            url: &self.endpoint,
            bearer: Some(&self.api_key),
            max_retries: self.max_retries,
        };
        let json = post.send(&self.client, &body).await?;
        parse_openai_response(&json)
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embed_batch(batch).await?;
            check_vectors(SERVICE, self.dims, batch.len(), &vectors)?;
            out.extend(vectors);
        }
        Ok(out)
    }
}

/// Parse the OpenAI embeddings API response JSON.
///
/// Extracts `data[].embedding` and orders the vectors by `data[].index`
/// so they line up with the request inputs.
fn parse_openai_response(json: &Value) -> Result<Vec<Vec<f32>>, RagError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());

    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: missing embedding"))?;

        let vec = embedding
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: non-numeric embedding"))?;

        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        indexed.push((index, vec));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}
