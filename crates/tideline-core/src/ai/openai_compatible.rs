//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Docker Model Runner (http://localhost:12434)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{Completion, CompletionRequest, FinishReason};
use super::AIBackend;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();

        let mut backend = Self::new(&host, &model);
        backend.api_key = api_key;
        Some(backend)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::AiResponse("No choices in OpenAI API response".into()))?;

        debug!(finish_reason = ?choice.finish_reason, "OpenAI-compatible response received");

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            finish: FinishReason::from_provider(choice.finish_reason.as_deref()),
        })
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLlmServer;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:12434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:12434");
    }

    #[test]
    fn test_from_env_reads_api_key() {
        std::env::set_var("OPENAI_COMPATIBLE_HOST", "http://localhost:12434/");
        std::env::set_var("OPENAI_COMPATIBLE_MODEL", "gpt-4");
        std::env::set_var("OPENAI_COMPATIBLE_API_KEY", "sk-test123");
        let backend = OpenAICompatibleBackend::from_env().unwrap();
        std::env::remove_var("OPENAI_COMPATIBLE_HOST");
        std::env::remove_var("OPENAI_COMPATIBLE_MODEL");
        std::env::remove_var("OPENAI_COMPATIBLE_API_KEY");

        assert_eq!(backend.model(), "gpt-4");
        assert_eq!(backend.host(), "http://localhost:12434");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "llama3.2".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: Some(0.2),
            max_tokens: Some(1800),
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["max_tokens"], 1800);
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_chat_completion_response_finish_reason() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "[{\"date\""},
                "finish_reason": "length"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("length"));
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://localhost:99999", "llama3.2");
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockLlmServer::start("[]").await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "test-model");

        let completion = backend
            .complete(&CompletionRequest::new("forecast", 100).with_system("json only"))
            .await
            .unwrap();
        assert_eq!(completion.text, "[]");
        assert!(!completion.is_truncated());
    }

    #[tokio::test]
    async fn test_error_status_is_a_transient_provider_failure() {
        let server = MockLlmServer::start("[]").await;
        let backend = OpenAICompatibleBackend::new(&format!("{}/missing", server.url()), "m");

        let err = backend
            .complete(&CompletionRequest::new("forecast", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider { status: 404, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_reports_truncation() {
        let server = MockLlmServer::start_truncated("[{").await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "test-model");

        let completion = backend
            .complete(&CompletionRequest::new("forecast", 10))
            .await
            .unwrap();
        assert_eq!(completion.finish, FinishReason::Length);
    }
}
