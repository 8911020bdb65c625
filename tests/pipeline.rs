//! End-to-end tests of the build and query path with in-process providers.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use askme::config::{Config, EmptyCorpusPolicy};
use askme::corpus::{prepare_corpus, Corpus, PLACEHOLDER_BIO};
use askme::embedding::{Embedder, HashEmbedder};
use askme::error::RagError;
use askme::llm::{DisabledGenerator, Generator, Prompt};
use askme::models::AnswerStatus;
use askme::pipeline::build_service;
use askme::qa::PROMPT_FOR_INPUT;

const RESUME: &str = "Jordan Lee
EPM Architect
Email: jordan@example.com
Summary
15+ years in Oracle EPM (PBCS, FCCS, Essbase). Leads Humana architecture and production support.

Experience
Humana: EPM architect for planning and consolidation. Owns month-end close support, CAB approvals and UAT sign-off.
Baker Hughes: migrated on-premise Hyperion Planning to PBCS; built FDMEE and CDM data integrations.
Citizens and RBS: delivered FCCS consolidation with intercompany eliminations and currency translation.
Projects
Resume assistant: a Flask REST API that answers questions about this profile using retrieval-augmented generation.
Upgrade factory: scripted upgrades from 11.1.2.2 to 11.1.2.4 across six environments with zero unplanned downtime.
Mobile approvals: a Flutter app for approving journal entries on the go.
Skills
Oracle EPM: PBCS, FCCS, Essbase, FDMEE, Data Management, OIC.
Programming: Python, Flask, REST APIs, Flutter, SQL.
AI: agentic workflows with LangChain and LangGraph.
";

/// Hash embedder that counts calls and can be switched off after the build.
struct SwitchableEmbedder {
    inner: HashEmbedder,
    calls: AtomicUsize,
    down: AtomicBool,
}

impl SwitchableEmbedder {
    fn new() -> Self {
        Self {
            inner: HashEmbedder::new(256),
            calls: AtomicUsize::new(0),
            down: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Embedder for SwitchableEmbedder {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dims(&self) -> usize {
        self.inner.dims()
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(RagError::unavailable("embeddings", "connection refused"));
        }
        self.inner.embed_many(texts).await
    }
}

/// Generator that echoes the question back.
#[derive(Default)]
struct EchoGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl Generator for EchoGenerator {
    fn model_name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("  Answer to: {}  \n", prompt.user))
    }
}

fn small_chunks() -> Config {
    let mut config = Config::default();
    config.chunking.chunk_size = 200;
    config.chunking.chunk_overlap = 40;
    config
}

fn corpus(text: &str) -> Corpus {
    prepare_corpus(
        text.to_string(),
        vec![PathBuf::from("data/resume.txt")],
        EmptyCorpusPolicy::Error,
    )
    .unwrap()
}

#[tokio::test]
async fn test_placeholder_corpus_answers_essbase_question() {
    let corpus = prepare_corpus(String::new(), vec![], EmptyCorpusPolicy::Fallback).unwrap();
    assert_eq!(corpus.text, PLACEHOLDER_BIO);

    let generator = Arc::new(EchoGenerator::default());
    let (qa, stats) = build_service(
        &Config::default(),
        &corpus,
        Arc::new(HashEmbedder::new(256)),
        generator.clone(),
    )
    .await
    .unwrap();

    assert!(stats.placeholder_corpus);
    assert_eq!(stats.chunks, 1);

    let response = qa.ask("What is your experience with Essbase?").await;
    assert_eq!(response.status, AnswerStatus::Answered);
    assert_eq!(
        response.answer,
        "Answer to: What is your experience with Essbase?"
    );
    assert_eq!(response.refs.len(), 1);
    assert!(response.refs[0].contains("Essbase"));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_profile_corpus_refs_are_bounded_and_relevant() {
    let (qa, stats) = build_service(
        &small_chunks(),
        &corpus(RESUME),
        Arc::new(HashEmbedder::new(256)),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();

    assert!(stats.chunks > 4);
    assert!(!stats.placeholder_corpus);

    let response = qa.ask("What is your experience with Essbase?").await;
    assert_eq!(response.status, AnswerStatus::Answered);
    assert_eq!(response.refs.len(), 4);
    assert!(response.refs.iter().all(|r| r.chars().count() <= 150));
    assert!(response.refs.iter().any(|r| r.contains("Essbase")));
}

#[tokio::test]
async fn test_blank_question_touches_no_provider() {
    let embedder = Arc::new(SwitchableEmbedder::new());
    let generator = Arc::new(EchoGenerator::default());
    let (qa, _) = build_service(
        &small_chunks(),
        &corpus(RESUME),
        embedder.clone(),
        generator.clone(),
    )
    .await
    .unwrap();
    let calls_after_build = embedder.calls.load(Ordering::SeqCst);

    for question in ["", "   ", "\n\t "] {
        let response = qa.ask(question).await;
        assert_eq!(response.status, AnswerStatus::NeedsQuestion);
        assert_eq!(response.answer, PROMPT_FOR_INPUT);
        assert!(response.refs.is_empty());
    }

    assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_build);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embedding_outage_degrades() {
    let embedder = Arc::new(SwitchableEmbedder::new());
    let generator = Arc::new(EchoGenerator::default());
    let (qa, _) = build_service(
        &small_chunks(),
        &corpus(RESUME),
        embedder.clone(),
        generator.clone(),
    )
    .await
    .unwrap();

    embedder.down.store(true, Ordering::SeqCst);
    let response = qa.ask("What is your experience with Essbase?").await;

    assert_eq!(response.status, AnswerStatus::Degraded);
    assert!(response.answer.starts_with("Agent unavailable. ("));
    assert!(response.answer.contains("connection refused"));
    assert!(response.refs.is_empty());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generation_outage_degrades() {
    let (qa, _) = build_service(
        &small_chunks(),
        &corpus(RESUME),
        Arc::new(HashEmbedder::new(256)),
        Arc::new(DisabledGenerator),
    )
    .await
    .unwrap();

    let response = qa.ask("Which mobile apps have you built?").await;
    assert_eq!(response.status, AnswerStatus::Degraded);
    assert!(response.answer.starts_with("Agent unavailable. ("));
    assert!(response.refs.is_empty());
}

#[tokio::test]
async fn test_build_failure_is_fatal() {
    let embedder = Arc::new(SwitchableEmbedder::new());
    embedder.down.store(true, Ordering::SeqCst);

    let result = build_service(
        &small_chunks(),
        &corpus(RESUME),
        embedder,
        Arc::new(EchoGenerator::default()),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_questions_share_one_service() {
    let (qa, _) = build_service(
        &small_chunks(),
        &corpus(RESUME),
        Arc::new(HashEmbedder::new(256)),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();
    let qa = Arc::new(qa);

    let questions = [
        "What is your experience with Essbase?",
        "Which mobile apps have you built?",
        "Tell me about Flask.",
        "Who are your clients?",
    ];

    let mut handles = Vec::new();
    for _ in 0..4 {
        for q in questions {
            let qa = qa.clone();
            handles.push(tokio::spawn(async move { (q, qa.ask(q).await) }));
        }
    }

    for handle in handles {
        let (q, response) = handle.await.unwrap();
        assert_eq!(response.status, AnswerStatus::Answered);
        assert_eq!(response.answer, format!("Answer to: {}", q));
        assert_eq!(response.refs.len(), 4);
    }
}

#[tokio::test]
async fn test_rebuild_gives_identical_results() {
    let config = small_chunks();
    let corpus = corpus(RESUME);

    let mut answers = Vec::new();
    for _ in 0..2 {
        let (qa, stats) = build_service(
            &config,
            &corpus,
            Arc::new(HashEmbedder::new(256)),
            Arc::new(EchoGenerator::default()),
        )
        .await
        .unwrap();
        let response = qa.ask("Tell me about upgrades").await;
        answers.push((stats.chunks, stats.corpus_sha256, response.refs));
    }

    assert_eq!(answers[0], answers[1]);
}

#[tokio::test]
async fn test_oversized_snippet_setting_is_clamped() {
    let mut config = Config::default();
    config.retrieval.snippet_chars = 400;

    let (qa, _) = build_service(
        &config,
        &corpus(&"Essbase ".repeat(200)),
        Arc::new(HashEmbedder::new(256)),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();

    let response = qa.ask("Essbase?").await;
    assert_eq!(response.status, AnswerStatus::Answered);
    assert!(!response.refs.is_empty());
    let longest = response.refs.iter().map(|r| r.chars().count()).max();
    assert_eq!(longest, Some(150));
}
