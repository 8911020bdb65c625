//! Question → top-k passages.

use std::sync::Arc;

use crate::embedding::Embedder;
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::models::ScoredPassage;

/// Default number of passages handed to the language model.
pub const DEFAULT_TOP_K: usize = 4;

/// Embeds a question and searches the index with a fixed `k`.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>, k: usize) -> Self {
        Self { embedder, index, k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Passages with their similarity scores, most relevant first.
    pub async fn retrieve_scored(&self, question: &str) -> Result<Vec<ScoredPassage>, RagError> {
        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, self.k)?;
        tracing::debug!(
            k = self.k,
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "retrieved passages"
        );
        Ok(hits)
    }

    /// Passage texts, most relevant first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>, RagError> {
        Ok(self
            .retrieve_scored(question)
            .await?
            .into_iter()
            .map(|p| p.text)
            .collect())
    }
}
