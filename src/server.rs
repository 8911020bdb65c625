//! HTTP boundary for the question-answering service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ask` | Answer `{"question": "..."}` with `{"answer": "...", "refs": [...]}` |
//! | `GET`  | `/health` | Health check with version, `top_k`, and index facts |
//!
//! # Status codes
//!
//! A blank, missing, or unparseable question gets `400` with
//! `{"answer": "Please provide a question."}`. Everything else gets `200`,
//! including degraded answers produced when the embedding or generation
//! service is unavailable.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser-hosted
//! profile page can call the API directly.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{AnswerResponse, AnswerStatus};
use crate::pipeline::BuildStats;
use crate::qa::QaService;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub qa: Arc<QaService>,
    pub stats: Arc<BuildStats>,
}

impl AppState {
    pub fn new(qa: QaService, stats: BuildStats) -> Self {
        Self {
            qa: Arc::new(qa),
            stats: Arc::new(stats),
        }
    }
}

/// Build the router with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind to `bind_addr` and serve until the process is terminated.
pub async fn run_server(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "askme server listening");
    println!("askme listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: Option<String>,
}

/// Body for `400` responses: the answer text only, no `refs`.
#[derive(Serialize)]
struct PromptBody {
    answer: String,
}

/// Handler for `POST /ask`.
///
/// The body is parsed leniently: anything that is not a JSON object with a
/// string `question` is treated as an empty question.
async fn handle_ask(State(state): State<AppState>, body: Bytes) -> Response {
    let question = serde_json::from_slice::<AskRequest>(&body)
        .ok()
        .and_then(|req| req.question)
        .unwrap_or_default();

    let response = state.qa.ask(&question).await;
    into_http(response)
}

fn into_http(response: AnswerResponse) -> Response {
    match response.status {
        AnswerStatus::NeedsQuestion => (
            StatusCode::BAD_REQUEST,
            Json(PromptBody {
                answer: response.answer,
            }),
        )
            .into_response(),
        AnswerStatus::Answered | AnswerStatus::Degraded => {
            (StatusCode::OK, Json(response)).into_response()
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
    /// Passages retrieved per question.
    top_k: usize,
    #[serde(flatten)]
    stats: BuildStats,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        top_k: state.qa.retriever().k(),
        stats: state.stats.as_ref().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_question_is_400_without_refs() {
        let resp = into_http(AnswerResponse::needs_question("Please provide a question."));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_degraded_is_200() {
        let resp = into_http(AnswerResponse::degraded("Agent unavailable. (x)".to_string()));
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
