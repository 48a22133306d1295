//! HTTP narrative generator
//!
//! Talks to a `generateContent`-style text generation endpoint:
//! the prompt is posted as `{"contents":[{"parts":[{"text": ...}]}]}` and
//! the reply text is read from `candidates[0].content.parts[0].text`.

use super::{NarrativeError, NarrativeGenerator};
use crate::config::NarrativeConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Narrative generator backed by a remote text generation API
pub struct HttpNarrator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl HttpNarrator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NarrativeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_retries: 0,
        })
    }

    pub fn from_config(config: &NarrativeConfig) -> Result<Self, NarrativeError> {
        Ok(Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            Duration::from_millis(config.timeout_ms),
        )?
        .max_retries(config.max_retries))
    }

    /// Builder: retries after a transient failure, on top of the first attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, body: &GenerateRequest<'_>) -> Result<String, NarrativeError> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(NarrativeError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::Malformed(e.to_string()))?;
        reply.into_text()
    }
}

#[async_trait]
impl NarrativeGenerator for HttpNarrator {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = GenerateRequest::new(prompt);
        let mut last_error = NarrativeError::Unavailable;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Backoff: 1s, 4s, 9s...
                let delay = Duration::from_secs(u64::from(attempt).pow(2));
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&body).await {
                Ok(text) => {
                    tracing::debug!(attempt, chars = text.len(), "Narrative generated");
                    return Ok(text);
                }
                Err(
                    e @ (NarrativeError::Timeout
                    | NarrativeError::Unavailable
                    | NarrativeError::RateLimited),
                ) => {
                    tracing::debug!(attempt, error = %e, "Narrative request failed, retrying");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}

fn classify(e: reqwest::Error) -> NarrativeError {
    if e.is_timeout() {
        NarrativeError::Timeout
    } else if e.is_connect() {
        NarrativeError::Unavailable
    } else {
        NarrativeError::Request(e)
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![PartRef { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<PartRef<'a>>,
}

#[derive(Debug, Serialize)]
struct PartRef<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, NarrativeError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| NarrativeError::Malformed("no candidate text in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::post, Json, Router};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest::new("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_extract_text() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "You slept less."}, {"text": "ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.into_text().unwrap(), "You slept less.");
    }

    #[test]
    fn test_malformed_replies() {
        for raw in [
            r#"{}"#,
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        ] {
            let reply: GenerateResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(reply.into_text(), Err(NarrativeError::Malformed(_))), "{}", raw);
        }
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let narrator = HttpNarrator::new("http://localhost:1", Some(String::new()), Duration::from_secs(1)).unwrap();
        assert!(narrator.api_key.is_none());
        assert_eq!(narrator.max_retries, 0);
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    #[tokio::test]
    async fn test_generate_against_local_server() {
        let app = Router::new().route(
            "/generate",
            post(
                |Query(params): Query<HashMap<String, String>>, Json(body): Json<serde_json::Value>| async move {
                    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
                    let key = params.get("key").cloned().unwrap_or_default();
                    Json(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": format!("{}:{}", key, prompt)}]}}]
                    }))
                },
            ),
        );
        let endpoint = spawn(app).await;

        let narrator = HttpNarrator::new(endpoint, Some("secret".to_string()), Duration::from_secs(5)).unwrap();
        let text = narrator.generate("hello").await.unwrap();
        assert_eq!(text, "secret:hello");
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let app = Router::new().route(
            "/generate",
            post(|| async { (axum::http::StatusCode::BAD_REQUEST, "bad prompt") }),
        );
        let endpoint = spawn(app).await;

        let narrator = HttpNarrator::new(endpoint, None, Duration::from_secs(5))
            .unwrap()
            .max_retries(3);
        match narrator.generate("hello").await {
            Err(NarrativeError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad prompt");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_retries_are_on_top_of_first_attempt() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/generate",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down")
                }
            }),
        );
        let endpoint = spawn(app).await;

        let once = HttpNarrator::new(endpoint.clone(), None, Duration::from_secs(5)).unwrap();
        assert!(matches!(once.generate("hello").await, Err(NarrativeError::RateLimited)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let retried = HttpNarrator::new(endpoint, None, Duration::from_secs(5))
            .unwrap()
            .max_retries(1);
        assert!(matches!(retried.generate("hello").await, Err(NarrativeError::RateLimited)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
