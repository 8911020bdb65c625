//! # askme
//!
//! Retrieval-augmented question answering over a small, fixed corpus of
//! profile documents.
//!
//! ## Architecture
//!
//! ```text
//! build (once):   corpus ──▶ Chunker ──▶ Embedder ──▶ VectorIndex
//!
//! query:          question ──▶ Embedder ──▶ Retriever ──▶ AnswerSynthesizer
//!                                               │                │
//!                                               └──── refs ──────┴──▶ AnswerResponse
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types: `Chunk`, `IndexEntry`, `ScoredPassage`, `AnswerResponse` |
//! | [`error`] | Query-path error taxonomy |
//! | [`chunk`] | Overlapping, boundary-aware chunking |
//! | [`embedding`] | `Embedder` trait and OpenAI / Ollama / hash / local adapters |
//! | [`llm`] | `Generator` trait and OpenAI / Ollama adapters |
//! | [`http`] | Shared JSON POST with retry and backoff |
//! | [`index`] | Exact cosine-similarity vector index |
//! | [`retriever`] | Question embedding + top-k search |
//! | [`synth`] | Grounded answer synthesis |
//! | [`qa`] | The `ask` operation |
//! | [`corpus`] | Corpus loading and empty-corpus policy |
//! | [`pipeline`] | Startup build of the query service |
//! | [`server`] | HTTP server (`POST /ask`, `GET /health`) |

pub mod chunk;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod http;
pub mod index;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod qa;
pub mod retriever;
pub mod server;
pub mod synth;
