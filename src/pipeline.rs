//! Startup build: corpus → chunks → vectors → index → [`QaService`].
//!
//! Runs once, sequentially, before any question is served. Every failure
//! here is fatal: without an index no question can be answered.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::chunk::Chunker;
use crate::config::Config;
use crate::corpus::{load_corpus, Corpus};
use crate::embedding::{create_embedder, Embedder};
use crate::index::VectorIndex;
use crate::llm::{create_generator, Generator};
use crate::models::IndexEntry;
use crate::qa::QaService;
use crate::retriever::Retriever;
use crate::synth::AnswerSynthesizer;

/// Facts about the built index, reported by `/health` and the CLI.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildStats {
    pub chunks: usize,
    pub dims: usize,
    pub embedding_model: String,
    pub corpus_sha256: String,
    pub placeholder_corpus: bool,
}

/// Chunk `text`, embed every chunk in one batched call, and index the result.
pub async fn build_index(
    text: &str,
    chunker: &Chunker,
    embedder: &dyn Embedder,
) -> Result<VectorIndex> {
    let chunks = chunker.split(text);
    let texts: Vec<String> = chunks.into_iter().map(|c| c.text).collect();

    let vectors = embedder
        .embed_many(&texts)
        .await
        .context("Failed to embed corpus chunks")?;

    let entries = texts
        .into_iter()
        .zip(vectors)
        .map(|(text, vector)| IndexEntry::new(text, vector))
        .collect();

    VectorIndex::build(embedder.dims(), entries).context("Failed to build vector index")
}

/// Build the query service over `corpus` with the given providers.
pub async fn build_service(
    config: &Config,
    corpus: &Corpus,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> Result<(QaService, BuildStats)> {
    let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
    let index = build_index(&corpus.text, &chunker, embedder.as_ref()).await?;

    let stats = BuildStats {
        chunks: index.len(),
        dims: index.dims(),
        embedding_model: embedder.model_name().to_string(),
        corpus_sha256: corpus.digest(),
        placeholder_corpus: corpus.placeholder,
    };
    tracing::info!(
        chunks = stats.chunks,
        dims = stats.dims,
        model = %stats.embedding_model,
        sources = corpus.sources.len(),
        corpus_sha256 = %stats.corpus_sha256,
        "index built"
    );

    let retriever = Retriever::new(embedder, Arc::new(index), config.retrieval.top_k);
    let service = QaService::new(retriever, AnswerSynthesizer::new(generator))
        .with_snippet_chars(config.retrieval.snippet_chars);

    Ok((service, stats))
}

/// Load the corpus and providers named in `config` and build the service.
pub async fn build_from_config(config: &Config) -> Result<(QaService, BuildStats)> {
    let corpus = load_corpus(&config.corpus)?;
    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.llm)?;
    build_service(config, &corpus, embedder, generator).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    #[tokio::test]
    async fn test_build_index_one_entry_per_chunk() {
        let chunker = Chunker::new(40, 8).unwrap();
        let text = "Oracle EPM and Essbase.\nPython and Flask.\nFlutter apps.\nCAB and UAT.";
        let index = build_index(text, &chunker, &HashEmbedder::new(64)).await.unwrap();
        assert_eq!(index.len(), chunker.split(text).len());
        assert_eq!(index.dims(), 64);
        assert!(index.len() > 1);
    }

    #[tokio::test]
    async fn test_build_index_empty_text() {
        let chunker = Chunker::new(40, 8).unwrap();
        let index = build_index("", &chunker, &HashEmbedder::new(8)).await.unwrap();
        assert!(index.is_empty());
    }
}
