//! TOML configuration parsing and validation.
//!
//! Every section is optional. A missing config file is not an error: the
//! defaults reproduce the stock deployment (OpenAI embeddings and
//! `gpt-4o-mini`, 800/120 chunking, top-4 retrieval, port 5000).
//!
//! ```toml
//! [corpus]
//! files = ["data/resume.txt", "data/skills.txt"]
//! on_empty = "fallback"
//!
//! [chunking]
//! chunk_size = 800
//! chunk_overlap = 120
//!
//! [retrieval]
//! top_k = 4
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-ada-002"
//! dims = 1536
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::qa::DEFAULT_SNIPPET_CHARS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// What to do when every corpus file is missing or blank.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCorpusPolicy {
    /// Index the built-in placeholder biography.
    #[default]
    Fallback,
    /// Refuse to start.
    Error,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_files")]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub on_empty: EmptyCorpusPolicy,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            files: default_corpus_files(),
            on_empty: EmptyCorpusPolicy::default(),
        }
    }
}

fn default_corpus_files() -> Vec<PathBuf> {
    ["contact", "resume", "projects", "skills"]
        .iter()
        .map(|name| PathBuf::from(format!("data/{}.txt", name)))
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    800
}
fn default_chunk_overlap() -> usize {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_top_k() -> usize {
    4
}
fn default_snippet_chars() -> usize {
    DEFAULT_SNIPPET_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL override (OpenAI-compatible gateway or Ollama host).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    /// Model name, falling back to the provider's default.
    pub fn model_or_default(&self) -> Option<String> {
        self.model.clone().or_else(|| match self.provider.as_str() {
            "openai" => Some("text-embedding-ada-002".to_string()),
            "ollama" => Some("nomic-embed-text".to_string()),
            "local" => Some("all-minilm-l6-v2".to_string()),
            "hash" => Some("hash-bow".to_string()),
            _ => None,
        })
    }

    /// Vector size, falling back to the known size of the default model.
    pub fn dims_or_default(&self) -> Option<usize> {
        self.dims.or_else(|| {
            match (self.provider.as_str(), self.model_or_default()?.as_str()) {
                ("openai", "text-embedding-ada-002") => Some(1536),
                ("openai", "text-embedding-3-small") => Some(1536),
                ("openai", "text-embedding-3-large") => Some(3072),
                ("ollama", "nomic-embed-text") => Some(768),
                ("local", "all-minilm-l6-v2") => Some(384),
                ("hash", _) => Some(256),
                _ => None,
            }
        })
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    2
}
fn default_embedding_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            temperature: 0.0,
            url: None,
            max_retries: default_max_retries(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

impl ServerConfig {
    /// Bind address with the port replaced by `port`, if given.
    pub fn bind_with_port(&self, port: Option<&str>) -> Result<String> {
        let Some(port) = port else {
            return Ok(self.bind.clone());
        };
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT is not a valid port number: '{}'", port))?;
        let host = self
            .bind
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(self.bind.as_str());
        Ok(format!("{}:{}", host, port))
    }
}

/// Load and validate the config file at `path`.
///
/// A missing file yields [`Config::default`]; a file that exists but does
/// not parse or validate is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Parse config TOML without touching the filesystem.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

/// Check cross-field constraints. Violations are fatal at startup.
pub fn validate(config: &Config) -> Result<()> {
    let chunking = &config.chunking;
    if chunking.chunk_size == 0 || chunking.chunk_overlap == 0 {
        bail!("chunking.chunk_size and chunking.chunk_overlap must both be > 0");
    }
    if chunking.chunk_overlap >= chunking.chunk_size {
        bail!(
            "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
            chunking.chunk_overlap,
            chunking.chunk_size
        );
    }

    if config.retrieval.top_k < 1 {
        bail!("retrieval.top_k must be >= 1");
    }
    let snippet_chars = config.retrieval.snippet_chars;
    if !(1..=DEFAULT_SNIPPET_CHARS).contains(&snippet_chars) {
        bail!(
            "retrieval.snippet_chars ({}) must be between 1 and {}",
            snippet_chars,
            DEFAULT_SNIPPET_CHARS
        );
    }

    match config.embedding.provider.as_str() {
        "openai" | "ollama" | "hash" | "local" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be openai, ollama, hash, or local.",
            other
        ),
    }
    if config.embedding.model_or_default().is_none() {
        bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }
    match config.embedding.dims_or_default() {
        Some(d) if d > 0 => {}
        _ => bail!(
            "embedding.dims must be > 0 for model '{}'",
            config.embedding.model_or_default().unwrap_or_default()
        ),
    }
    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be > 0");
    }

    match config.llm.provider.as_str() {
        "openai" | "ollama" | "disabled" => {}
        other => bail!(
            "Unknown llm provider: '{}'. Must be openai, ollama, or disabled.",
            other
        ),
    }
    if config.llm.model.trim().is_empty() {
        bail!("llm.model must not be empty");
    }

    Ok(())
}
