//! JSON-over-HTTP calls with bounded retry, shared by every network adapter.
//!
//! Retry strategy:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors and timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Every failure, including exhausted retries, comes back as
//! [`RagError::ServiceUnavailable`] tagged with the calling service.

use serde_json::Value;
use std::time::Duration;

use crate::error::RagError;

/// Build a client with a per-request timeout.
pub fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Delay before retry number `attempt` (1-based).
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

/// A single POST target: where to send, how to authenticate, and how hard to try.
pub struct JsonPost<'a> {
    /// Label used in errors and logs, e.g. `"OpenAI embeddings"`.
    pub service: &'a str,
    pub url: &'a str,
    pub bearer: Option<&'a str>,
    pub max_retries: u32,
}

impl JsonPost<'_> {
    /// Send `body` and return the parsed JSON response.
    pub async fn send(&self, client: &reqwest::Client, body: &Value) -> Result<Value, RagError> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff(attempt);
                tracing::debug!(service = self.service, attempt, ?delay, "retrying request");
                tokio::time::sleep(delay).await;
            }

            let mut request = client
                .post(self.url)
                .header("Content-Type", "application/json")
                .json(body);
            if let Some(key) = self.bearer {
                request = request.header("Authorization", format!("Bearer {}", key));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| {
                            RagError::unavailable(self.service, format!("invalid JSON: {}", e))
                        });
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err =
                        RagError::unavailable(self.service, format!("HTTP {}: {}", status, body_text));

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let message = if e.is_timeout() {
                        format!("request timed out: {}", e)
                    } else {
                        format!("request failed: {}", e)
                    };
                    last_err = Some(RagError::unavailable(self.service, message));
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| RagError::unavailable(self.service, "failed after retries")))
    }
}
