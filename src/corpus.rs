//! Corpus loading and the empty-corpus policy.
//!
//! The corpus is the newline-joined, trimmed contents of the configured
//! profile files, read once at startup. Missing files are skipped. When
//! nothing is left, [`EmptyCorpusPolicy`] decides between indexing
//! [`PLACEHOLDER_BIO`] and refusing to start.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::config::{CorpusConfig, EmptyCorpusPolicy};

/// Indexed when no profile text is available and the policy allows it.
pub const PLACEHOLDER_BIO: &str = "\
15+ years in Oracle EPM (PBCS, FCCS, Essbase). Leads Humana architecture and production support.
Python, Flask, REST APIs, Flutter. Agentic AI with LangChain/LangGraph. Clients: CAP, Citizens, RBS, ICA, Baker Hughes.
Upgrades: 11.1.2.2 -> 11.1.2.4; FDMEE/CDM/OIC integrations; CAB/UAT/change mgmt.
";

/// The text to index, plus where it came from.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub text: String,
    /// Files that were found and read, in order.
    pub sources: Vec<PathBuf>,
    /// `true` if [`PLACEHOLDER_BIO`] replaced an empty corpus.
    pub placeholder: bool,
}

impl Corpus {
    /// Hex SHA-256 of the corpus text; identifies the index contents.
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.text.as_bytes()))
    }
}

/// Read the configured files and apply the empty-corpus policy.
pub fn load_corpus(config: &CorpusConfig) -> Result<Corpus> {
    let mut text = String::new();
    let mut sources = Vec::new();

    for path in &config.files {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "corpus file not found, skipping");
            continue;
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
        text.push_str(content.trim());
        text.push('\n');
        sources.push(path.clone());
    }

    prepare_corpus(text, sources, config.on_empty)
}

/// Apply the empty-corpus policy to already-loaded text.
pub fn prepare_corpus(
    text: String,
    sources: Vec<PathBuf>,
    on_empty: EmptyCorpusPolicy,
) -> Result<Corpus> {
    if !text.trim().is_empty() {
        return Ok(Corpus {
            text,
            sources,
            placeholder: false,
        });
    }

    match on_empty {
        EmptyCorpusPolicy::Fallback => {
            tracing::warn!("corpus is empty, indexing the built-in placeholder biography");
            Ok(Corpus {
                text: PLACEHOLDER_BIO.to_string(),
                sources,
                placeholder: true,
            })
        }
        EmptyCorpusPolicy::Error => {
            bail!("corpus is empty: none of the configured files exist or have content")
        }
    }
}
