//! Core data models used throughout askme.
//!
//! These types represent the chunks, index entries, retrieval results, and
//! answers that flow through the build and query pipeline.

use serde::Serialize;

/// A contiguous slice of the corpus produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in the chunk sequence, starting at 0.
    pub index: usize,
    /// Offset of the first character in the corpus, counted in `char`s.
    pub start: usize,
    pub text: String,
}

impl Chunk {
    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A vector paired with the chunk text it was computed from.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub text: String,
    pub vector: Vec<f32>,
}

impl IndexEntry {
    pub fn new(text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            vector,
        }
    }
}

/// One retrieval hit: the chunk text and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub text: String,
    pub score: f32,
}

/// How a question was handled. Not part of the JSON payload; the HTTP
/// layer uses it to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    /// Retrieval and synthesis succeeded.
    Answered,
    /// The question was empty; the answer asks for input.
    NeedsQuestion,
    /// A service failed; the answer explains the failure.
    Degraded,
}

/// The response returned by [`crate::qa::QaService::ask`].
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    /// Prefixes of the passages used as grounding evidence.
    pub refs: Vec<String>,
    #[serde(skip)]
    pub status: AnswerStatus,
}

impl AnswerResponse {
    pub fn answered(answer: String, refs: Vec<String>) -> Self {
        Self {
            answer,
            refs,
            status: AnswerStatus::Answered,
        }
    }

    pub fn needs_question(message: &str) -> Self {
        Self {
            answer: message.to_string(),
            refs: Vec::new(),
            status: AnswerStatus::NeedsQuestion,
        }
    }

    pub fn degraded(answer: String) -> Self {
        Self {
            answer,
            refs: Vec::new(),
            status: AnswerStatus::Degraded,
        }
    }
}
