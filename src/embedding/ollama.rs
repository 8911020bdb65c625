//! Ollama embeddings adapter.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{check_vectors, resolve_dims, resolve_model, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::RagError;
use crate::http::{build_client, JsonPost};

const SERVICE: &str = "Ollama embeddings";
pub(crate) const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured Ollama URL (default: `http://localhost:11434`).
/// Requires Ollama to be running with an embedding model pulled (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaEmbedder {
    model: String,
    dims: usize,
    endpoint: String,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base = config.url.as_deref().unwrap_or(OLLAMA_BASE_URL);
        Ok(Self {
            model: resolve_model(config)?,
            dims: resolve_dims(config)?,
            endpoint: format!("{}/api/embed", base.trim_end_matches('/')),
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let post = JsonPost {
            service: SERVICE,
            url: &self.endpoint,
            bearer: None,
            max_retries: self.max_retries,
        };

        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = post.send(&self.client, &body).await?;
            let vectors = parse_ollama_response(&json)?;
            check_vectors(SERVICE, self.dims, batch.len(), &vectors)?;
            out.extend(vectors);
        }
        Ok(out)
    }
}

fn parse_ollama_response(json: &Value) -> Result<Vec<Vec<f32>>, RagError> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| RagError::unavailable(SERVICE, "invalid response: missing embeddings array"))?;

    embeddings
        .iter()
        .map(|embedding| {
            embedding
                .as_array()
                .and_then(|values| {
                    values
                        .iter()
                        .map(|v| v.as_f64().map(|f| f as f32))
                        .collect::<Option<Vec<f32>>>()
                })
                .ok_or_else(|| {
                    RagError::unavailable(SERVICE, "invalid response: embedding is not a number array")
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ollama_response() {
        let json = serde_json::json!({ "embeddings": [[0.5, 0.5], [1.0, 0.0]] });
        let vecs = parse_ollama_response(&json).unwrap();
        assert_eq!(vecs.len(), 2);
        assert_eq!(vecs[1], vec![1.0, 0.0]);

        let bad = serde_json::json!({ "embeddings": [["a"]] });
        assert!(parse_ollama_response(&bad).is_err());
    }

    #[test]
    fn test_default_endpoint_and_dims() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            ..EmbeddingConfig::default()
        };
        let e = OllamaEmbedder::new(&config).unwrap();
        assert_eq!(e.endpoint, "http://localhost:11434/api/embed");
        assert_eq!(e.model_name(), "nomic-embed-text");
        assert_eq!(e.dims(), 768);
    }
}
