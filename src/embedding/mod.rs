//! Embedding provider abstraction and implementations.
//!
//! Defines the [`Embedder`] trait and concrete implementations:
//! - **[`OpenAIEmbedder`]** — calls the OpenAI embeddings API with batching, retry, and backoff.
//! - **[`OllamaEmbedder`]** — calls a local Ollama instance's `/api/embed` endpoint.
//! - **[`HashEmbedder`]** — offline feature-hashed bag of words; no model, no network.
//! - **`LocalEmbedder`** — runs models locally via fastembed (feature `local-embeddings-fastembed`).
//!
//! Also provides [`cosine_similarity`] and [`normalize`] for the index.
//!
//! # Provider Selection
//!
//! Use [`create_embedder`] to instantiate the provider named in the
//! configuration:
//!
//! ```rust
//! # use askme::config::EmbeddingConfig;
//! # use askme::embedding::create_embedder;
//! let config = EmbeddingConfig {
//!     provider: "hash".to_string(),
//!     ..EmbeddingConfig::default()
//! };
//! let embedder = create_embedder(&config).unwrap();
//! assert_eq!(embedder.dims(), 256);
//! ```
//!
//! # Failure
//!
//! Any failure reaching the service (network, auth, quota, timeout) or a
//! response with the wrong shape is reported as
//! [`RagError::ServiceUnavailable`]. Providers never substitute a zero
//! vector for a failed call.

mod hash;
#[cfg(feature = "local-embeddings-fastembed")]
mod local;
mod ollama;
mod openai;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::RagError;

pub use hash::HashEmbedder;
#[cfg(feature = "local-embeddings-fastembed")]
pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;
pub(crate) use ollama::OLLAMA_BASE_URL;
pub use openai::OpenAIEmbedder;
pub(crate) use openai::{openai_api_key, OPENAI_BASE_URL};

/// Maps text to fixed-size dense vectors.
///
/// Embedding is treated as a pure function of the input text for a pinned
/// model: [`embed_many`](Embedder::embed_many) must return the same vectors
/// as calling [`embed`](Embedder::embed) once per item. Implementations
/// must be safe to share across concurrent queries.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-ada-002"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_many(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::unavailable(self.model_name(), "empty embedding response"))
    }
}

/// Create the [`Embedder`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"openai"` | [`OpenAIEmbedder`] |
/// | `"ollama"` | [`OllamaEmbedder`] |
/// | `"hash"` | [`HashEmbedder`] |
/// | `"local"` | `LocalEmbedder` (needs `local-embeddings-fastembed`) |
///
/// # Errors
///
/// Fails for unknown providers, a missing model or dimension, a missing
/// API key, or a provider whose cargo feature is off. All of these are
/// startup configuration errors.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIEmbedder::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        "hash" => Ok(Arc::new(HashEmbedder::new(resolve_dims(config)?))),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Arc::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Model name from config or the provider default.
pub(crate) fn resolve_model(config: &EmbeddingConfig) -> Result<String> {
    config.model_or_default().ok_or_else(|| {
        anyhow::anyhow!(
            "embedding.model required for {} provider",
            config.provider
        )
    })
}

/// Vector size from config or the known size of the model.
pub(crate) fn resolve_dims(config: &EmbeddingConfig) -> Result<usize> {
    match config.dims_or_default() {
        Some(d) if d > 0 => Ok(d),
        _ => bail!(
            "embedding.dims required for {} provider",
            config.provider
        ),
    }
}

/// Check that a provider returned `expected` vectors of `dims` entries each.
pub(crate) fn check_vectors(
    service: &str,
    dims: usize,
    expected: usize,
    vectors: &[Vec<f32>],
) -> Result<(), RagError> {
    if vectors.len() != expected {
        return Err(RagError::unavailable(
            service,
            format!("expected {} embeddings, got {}", expected, vectors.len()),
        ));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
        return Err(RagError::unavailable(
            service,
            format!("expected {}-dimensional embeddings, got {}", dims, bad.len()),
        ));
    }
    Ok(())
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, and
/// zero vectors.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
///
/// The norm is accumulated in `f64`, so any finite `f32` vector keeps its
/// direction even when its squared norm would overflow `f32`.
pub fn normalize(v: &mut [f32]) {
    let norm = v
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt();
    if norm >= f64::from(f32::EPSILON) {
        for x in v.iter_mut() {
            *x = (f64::from(*x) / norm) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_normalize_large_components() {
        let mut v = vec![3.0e20, 4.0e20];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_check_vectors() {
        let ok = vec![vec![0.0; 3], vec![1.0; 3]];
        assert!(check_vectors("svc", 3, 2, &ok).is_ok());
        assert!(check_vectors("svc", 3, 3, &ok).is_err());
        assert!(check_vectors("svc", 4, 2, &ok).unwrap_err().is_service_unavailable());
    }

    #[test]
    fn test_create_embedder_rejects_unknown() {
        let config = EmbeddingConfig {
            provider: "cohere".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(create_embedder(&config).is_err());
    }

    #[cfg(not(feature = "local-embeddings-fastembed"))]
    #[test]
    fn test_local_requires_feature() {
        let config = EmbeddingConfig {
            provider: "local".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = create_embedder(&config).err().unwrap().to_string();
        assert!(err.contains("local-embeddings-fastembed"));
    }
}
