//! Language-model generation providers.
//!
//! Mirrors the [`crate::embedding`] layout: a [`Generator`] trait with one
//! adapter per hosted service, selected once at startup by
//! [`create_generator`]. Every call is a single non-streaming
//! request/response.
//!
//! | Config Value | Provider |
//! |-------------|----------|
//! | `"openai"` | [`OpenAIGenerator`] (`/chat/completions`) |
//! | `"ollama"` | [`OllamaGenerator`] (`/api/chat`) |
//! | `"disabled"` | [`DisabledGenerator`] (every call fails) |

mod ollama;
mod openai;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::RagError;

pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;

/// A two-part chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Produces text from a prompt. Implementations must be safe to share
/// across concurrent queries.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Run one generation request and return the reply text.
    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError>;
}

/// A generator that always fails; every answer degrades to an
/// unavailability message.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &Prompt) -> Result<String, RagError> {
        Err(RagError::unavailable("generation", "LLM provider is disabled"))
    }
}

/// Create the [`Generator`] named by `config.provider`.
///
/// # Errors
///
/// Fails for unknown providers or a missing `OPENAI_API_KEY`.
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        other => bail!("Unknown llm provider: {}", other),
    }
}
