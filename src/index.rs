//! Exact in-memory vector index.
//!
//! Entries are L2-normalized once at build time, so a search is one dot
//! product per entry (cosine similarity) followed by a stable sort. For the
//! corpus sizes this crate targets (tens to low thousands of chunks) a
//! brute-force scan is fast and has perfect recall.
//!
//! The index is immutable after [`VectorIndex::build`]; `search` takes
//! `&self` and touches no shared mutable state, so one index can serve
//! concurrent queries behind an `Arc` without locking.

use thiserror::Error;

use crate::embedding::normalize;
use crate::models::{IndexEntry, ScoredPassage};

#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("index dimension must be > 0")]
    ZeroDimension,

    #[error("vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector contains a non-finite value")]
    NonFinite,
}

/// A stored entry: chunk text plus its unit-length vector.
#[derive(Debug, Clone)]
struct Stored {
    text: String,
    unit: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    dims: usize,
    entries: Vec<Stored>,
}

impl VectorIndex {
    /// Build an index over `entries`, all of which must have `dims` values.
    ///
    /// Insertion order is kept and used to break score ties.
    pub fn build(dims: usize, entries: Vec<IndexEntry>) -> Result<Self, IndexError> {
        if dims == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            check_vector(dims, &entry.vector)?;
            let mut unit = entry.vector;
            normalize(&mut unit);
            stored.push(Stored {
                text: entry.text,
                unit,
            });
        }

        Ok(Self {
            dims,
            entries: stored,
        })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` entries most similar to `query`, best first.
    ///
    /// `k` is clamped to the index size. Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>, IndexError> {
        check_vector(self.dims, query)?;
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut q = query.to_vec();
        normalize(&mut q);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, dot(&q, &e.unit)))
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredPassage {
                text: self.entries[i].text.clone(),
                score,
            })
            .collect())
    }
}

fn check_vector(dims: usize, v: &[f32]) -> Result<(), IndexError> {
    if v.len() != dims {
        return Err(IndexError::DimensionMismatch {
            expected: dims,
            actual: v.len(),
        });
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(IndexError::NonFinite);
    }
    Ok(())
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
