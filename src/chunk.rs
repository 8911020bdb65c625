//! Overlapping, boundary-aware text chunker.
//!
//! Splits corpus text into [`Chunk`]s of at most `chunk_size` characters.
//! Each chunk after the first starts `chunk_overlap` characters before the
//! end of its predecessor, so consecutive chunks share exactly
//! `chunk_overlap` characters and dropping that prefix from every chunk but
//! the first reconstructs the input.
//!
//! # Algorithm
//!
//! 1. Open a window of `chunk_size` characters at the current start.
//! 2. If the window reaches the end of the text, emit it and stop.
//! 3. Otherwise look for a split point inside the window, trying
//!    [`SEPARATORS`] in order (paragraph break, line break, sentence end,
//!    word break). The split lands just after the separator. A candidate
//!    is only taken if it keeps the chunk at least half a window long and
//!    longer than the overlap.
//! 4. With no acceptable separator, cut at the window edge.
//! 5. Step the start back by `chunk_overlap` from the split and repeat.
//!
//! Lengths are counted in `char`s, so multi-byte text is never cut inside
//! a code point.
//!
//! # Example
//!
//! ```rust
//! use askme::chunk::Chunker;
//!
//! let chunker = Chunker::new(800, 120).unwrap();
//! let chunks = chunker.split("Hello world.\n\nSecond paragraph.");
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].index, 0);
//! ```

use anyhow::{bail, Result};

use crate::models::Chunk;

/// Split boundaries in order of preference.
pub const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", "; ", ", ", " "];

/// Character-window chunker with overlap.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Fails if `chunk_size` is zero or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            bail!("chunk_size must be > 0");
        }
        if chunk_overlap >= chunk_size {
            bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap,
                chunk_size
            );
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into overlapping chunks with contiguous indices.
    ///
    /// Empty text yields no chunks; text of at most `chunk_size` characters
    /// yields exactly one. The final chunk keeps whatever is left, however
    /// short.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every char, plus the end of the string.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                total
            } else {
                self.split_point(text, &offsets, start, window_end)
            };

            chunks.push(Chunk {
                index: chunks.len(),
                start,
                text: text[offsets[start]..offsets[end]].to_string(),
            });

            if end == total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }

    /// Pick where the chunk starting at `start` should end, given a full
    /// window ending at `window_end` (both in chars).
    fn split_point(&self, text: &str, offsets: &[usize], start: usize, window_end: usize) -> usize {
        // Every split must move the next start forward.
        let min_end = (start + self.chunk_overlap + 1).max(start + self.chunk_size / 2);
        let window = &text[offsets[start]..offsets[window_end]];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                let end = start + window[..pos + sep.len()].chars().count();
                if end >= min_end {
                    return end;
                }
            }
        }

        window_end
    }
}
