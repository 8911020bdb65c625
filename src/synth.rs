//! Grounded answer synthesis.
//!
//! All passages are "stuffed" into one system prompt in retrieval order and
//! the model is asked to answer from that context alone. One request, no
//! streaming, no tool use.

use std::sync::Arc;

use crate::error::RagError;
use crate::llm::{Generator, Prompt};

/// Returned without calling the model when retrieval found nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find anything relevant to that question in the profile.";

/// Returned when the model replies with only whitespace.
pub const EMPTY_REPLY_ANSWER: &str = "No answer.";

const SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's \
question. Answer using only this context. If the answer is not in the context, say that \
you don't know; don't try to make up an answer.\n\
----------------\n";

pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Answer `question` from `passages`.
    pub async fn answer(&self, question: &str, passages: &[String]) -> Result<String, RagError> {
        if passages.iter().all(|p| p.trim().is_empty()) {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let reply = self.generator.generate(&build_prompt(question, passages)).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(EMPTY_REPLY_ANSWER.to_string());
        }
        Ok(reply.to_string())
    }
}

/// Build the prompt: passages joined by blank lines under the system
/// instructions, the question as the user turn.
pub fn build_prompt(question: &str, passages: &[String]) -> Prompt {
    let context = passages.join("\n\n");
    Prompt {
        system: format!("{}{}", SYSTEM_TEMPLATE, context),
        user: question.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records prompts and replies with a canned string.
    struct Recorder {
        reply: String,
        calls: AtomicUsize,
        last: Mutex<Option<Prompt>>,
    }

    impl Recorder {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Generator for Recorder {
        fn model_name(&self) -> &str {
            "recorder"
        }

        async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(prompt.clone());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_empty_passages_skip_model() {
        let rec = Recorder::new("should not be used");
        let synth = AnswerSynthesizer::new(rec.clone());
        let answer = synth.answer("Anything?", &[]).await.unwrap();
        assert_eq!(answer, NO_CONTEXT_ANSWER);
        assert_eq!(rec.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_context_in_retrieval_order() {
        let rec = Recorder::new("  15+ years.  ");
        let synth = AnswerSynthesizer::new(rec.clone());
        let passages = vec!["first passage".to_string(), "second passage".to_string()];
        let answer = synth.answer("How long?", &passages).await.unwrap();
        assert_eq!(answer, "15+ years.");

        let prompt = rec.last.lock().unwrap().clone().unwrap();
        assert_eq!(prompt.user, "How long?");
        assert!(prompt.system.ends_with("first passage\n\nsecond passage"));
        assert!(prompt.system.contains("only this context"));
    }

    #[tokio::test]
    async fn test_blank_reply() {
        let synth = AnswerSynthesizer::new(Recorder::new("   "));
        let answer = synth.answer("q", &["ctx".to_string()]).await.unwrap();
        assert_eq!(answer, EMPTY_REPLY_ANSWER);
    }

    #[tokio::test]
    async fn test_generator_error_propagates() {
        let synth = AnswerSynthesizer::new(Arc::new(crate::llm::DisabledGenerator));
        let err = synth.answer("q", &["ctx".to_string()]).await.unwrap_err();
        assert!(err.is_service_unavailable());
    }
}
