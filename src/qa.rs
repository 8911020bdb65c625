//! Question answering: validate, retrieve, synthesize, package.
//!
//! [`QaService::ask`] always produces an [`AnswerResponse`]. An empty
//! question gets a prompt for input; any retrieval or generation failure
//! is logged and turned into a degraded answer carrying the error text.
//! Nothing on the query path can make `ask` fail.

use crate::error::RagError;
use crate::models::AnswerResponse;
use crate::retriever::Retriever;
use crate::synth::AnswerSynthesizer;

/// Answer for a missing or blank question.
pub const PROMPT_FOR_INPUT: &str = "Please provide a question.";

/// Default and upper bound for the length of each entry in `refs`, in
/// characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 150;

/// Process-wide query service. Holds only read-only state, so one instance
/// can be shared behind an `Arc` by concurrent requests.
pub struct QaService {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    snippet_chars: usize,
}

impl QaService {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            retriever,
            synthesizer,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    /// Shorten `refs` entries to `snippet_chars`, kept within
    /// `1..=DEFAULT_SNIPPET_CHARS`.
    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars.clamp(1, DEFAULT_SNIPPET_CHARS);
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `question`. Never fails; see the module docs.
    pub async fn ask(&self, question: &str) -> AnswerResponse {
        let question = match validate_question(question) {
            Ok(q) => q,
            Err(_) => return AnswerResponse::needs_question(PROMPT_FOR_INPUT),
        };

        match self.answer(question).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "answering failed, returning degraded response");
                AnswerResponse::degraded(format!("Agent unavailable. ({})", e))
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<AnswerResponse, RagError> {
        let passages = self.retriever.retrieve(question).await?;
        let answer = self.synthesizer.answer(question, &passages).await?;
        let refs = passages
            .iter()
            .map(|p| snippet(p, self.snippet_chars))
            .collect();
        tracing::info!(
            passages = passages.len(),
            model = self.synthesizer.model_name(),
            "answered question"
        );
        Ok(AnswerResponse::answered(answer, refs))
    }
}

/// Trim the question and reject it if nothing is left.
pub fn validate_question(question: &str) -> Result<&str, RagError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(RagError::InvalidInput("question is empty".to_string()));
    }
    Ok(trimmed)
}

/// First `max_chars` characters of `text`.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_question() {
        assert!(matches!(validate_question(""), Err(RagError::InvalidInput(_))));
        assert!(validate_question(" \t\n ").is_err());
        assert_eq!(validate_question("  Essbase?  ").unwrap(), "Essbase?");
    }

    #[test]
    fn test_snippet_is_prefix_in_chars() {
        assert_eq!(snippet("short", 150), "short");
        let long = "é".repeat(200);
        let cut = snippet(&long, 150);
        assert_eq!(cut.chars().count(), 150);
        assert!(long.starts_with(&cut));
    }
}
