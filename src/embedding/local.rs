//! Local inference via fastembed.
//!
//! Models are downloaded on first use from Hugging Face and cached. After
//! the initial download no network calls are needed. ORT is bundled, so
//! there are no system dependencies.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{check_vectors, resolve_dims, resolve_model, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::RagError;

const SERVICE: &str = "local embeddings";

pub struct LocalEmbedder {
    model_name: String,
    model: fastembed::EmbeddingModel,
    dims: usize,
    batch_size: usize,
    engine: Arc<Mutex<Option<fastembed::TextEmbedding>>>,
}

impl LocalEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_name = resolve_model(config)?;
        Ok(Self {
            model: config_to_fastembed_model(&model_name)?,
            model_name,
            dims: resolve_dims(config)?,
            batch_size: config.batch_size.max(1),
            engine: Arc::new(Mutex::new(None)),
        })
    }
}

fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, nomic-embed-text-v1.5",
            other
        ),
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let engine = Arc::clone(&self.engine);
        let model = self.model.clone();
        let batch_size = self.batch_size;
        let inputs = texts.to_vec();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut guard = engine
                .lock()
                .map_err(|_| RagError::unavailable(SERVICE, "model lock poisoned"))?;
            if guard.is_none() {
                let loaded = fastembed::TextEmbedding::try_new(
                    fastembed::InitOptions::new(model).with_show_download_progress(true),
                )
                .map_err(|e| RagError::unavailable(SERVICE, format!("failed to load model: {}", e)))?;
                *guard = Some(loaded);
            }
            let Some(embedding) = guard.as_mut() else {
                return Err(RagError::unavailable(SERVICE, "model not loaded"));
            };
            embedding
                .embed(inputs, Some(batch_size))
                .map_err(|e| RagError::unavailable(SERVICE, e.to_string()))
        })
        .await
        .map_err(|e| RagError::unavailable(SERVICE, format!("embedding task failed: {}", e)))??;

        check_vectors(SERVICE, self.dims, texts.len(), &vectors)?;
        Ok(vectors)
    }
}
