//! Test utilities for tideline-core
//!
//! This module provides a mock LLM server speaking both the Ollama and the
//! OpenAI-compatible wire formats, so the real HTTP backends can be exercised
//! in tests and local development.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// What every completion endpoint answers with
#[derive(Debug, Clone)]
struct Script {
    text: String,
    truncated: bool,
    delay: Option<Duration>,
}

/// Mock LLM server for testing and development
pub struct MockLlmServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start a server answering every completion with `text`
    pub async fn start(text: &str) -> Self {
        Self::spawn(Script {
            text: text.to_string(),
            truncated: false,
            delay: None,
        })
        .await
    }

    /// Start a server reporting every completion as cut at the token limit
    pub async fn start_truncated(text: &str) -> Self {
        Self::spawn(Script {
            text: text.to_string(),
            truncated: true,
            delay: None,
        })
        .await
    }

    /// Start a server that waits `delay` before answering
    pub async fn start_delayed(text: &str, delay: Duration) -> Self {
        Self::spawn(Script {
            text: text.to_string(),
            truncated: false,
            delay: Some(delay),
        })
        .await
    }

    async fn spawn(script: Script) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(Arc::new(script));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn pause(script: &Script) {
    if let Some(delay) = script.delay {
        tokio::time::sleep(delay).await;
    }
}

/// Ollama tags endpoint (health check)
async fn handle_tags() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": [{"name": "llama3.2:latest", "modified_at": "2024-01-01T00:00:00Z"}]
    }))
}

/// OpenAI models endpoint (health check)
async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model"}]
    }))
}

/// Ollama generate endpoint
async fn handle_generate(
    State(script): State<Arc<Script>>,
    Json(request): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    pause(&script).await;

    Json(GenerateResponse {
        model: request.model,
        response: script.text.clone(),
        done: true,
        done_reason: if script.truncated { "length" } else { "stop" }.to_string(),
    })
}

/// OpenAI-compatible chat completions endpoint
async fn handle_chat(
    State(script): State<Arc<Script>>,
    Json(request): Json<ChatRequest>,
) -> Json<serde_json::Value> {
    pause(&script).await;

    let finish_reason = if script.truncated { "length" } else { "stop" };
    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": script.text},
            "finish_reason": finish_reason
        }]
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
    done_reason: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_health_endpoints() {
        let server = MockLlmServer::start("[]").await;
        let client = reqwest::Client::new();

        let tags = client
            .get(format!("{}/api/tags", server.url()))
            .send()
            .await
            .unwrap();
        assert!(tags.status().is_success());

        let models = client
            .get(format!("{}/v1/models", server.url()))
            .send()
            .await
            .unwrap();
        assert!(models.status().is_success());
    }

    #[tokio::test]
    async fn test_mock_server_generate_reports_done_reason() {
        let server = MockLlmServer::start_truncated("[{").await;
        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("{}/api/generate", server.url()))
            .json(&serde_json::json!({"model": "m", "prompt": "p", "stream": false}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["response"], "[{");
        assert_eq!(body["done_reason"], "length");
    }
}
