//! Mock backend for testing
//!
//! Returns a scripted completion and counts calls, so tests can assert on
//! cache behavior without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{Completion, CompletionRequest, FinishReason};
use super::AIBackend;

const UNSCRIPTED_REPLY: &str = "Mock backend has no forecast scripted.";

/// What the mock does when asked for a completion
#[derive(Debug, Clone)]
enum Script {
    Reply(Completion),
    Fail(String),
}

/// Mock AI backend for testing
///
/// Clones share the call counter.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    script: Script,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend
    ///
    /// Until scripted with `with_response`, it answers with prose that holds
    /// no forecast, so callers fall back to their non-AI path.
    pub fn new() -> Self {
        Self {
            healthy: true,
            script: Script::Reply(Completion::stop(UNSCRIPTED_REPLY)),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer every request with `text`
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.script = Script::Reply(Completion::stop(text));
        self
    }

    /// Answer every request with `text` cut at the token limit
    pub fn truncated(mut self, text: impl Into<String>) -> Self {
        self.script = Script::Reply(Completion {
            text: text.into(),
            finish: FinishReason::Length,
        });
        self
    }

    /// Fail every request with a provider error
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.script = Script::Fail(message.into());
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Reply(completion) => Ok(completion.clone()),
            Script::Fail(message) => Err(Error::Provider {
                status: 503,
                message: message.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_response_and_counter() {
        let mock = MockBackend::new().with_response("[{\"date\":\"2024-01-01\"}]");
        let shared = mock.clone();

        let completion = mock.complete(&CompletionRequest::new("x", 10)).await.unwrap();
        assert!(completion.text.contains("2024-01-01"));
        assert_eq!(shared.calls(), 1);
    }

    #[tokio::test]
    async fn test_truncated_and_failing() {
        let cut = MockBackend::new().truncated("[{");
        assert!(cut
            .complete(&CompletionRequest::new("x", 10))
            .await
            .unwrap()
            .is_truncated());

        let broken = MockBackend::new().failing("boom");
        let err = broken
            .complete(&CompletionRequest::new("x", 10))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_health() {
        assert!(MockBackend::new().health_check().await);

        let down = MockBackend {
            healthy: false,
            ..MockBackend::new()
        };
        assert!(!down.health_check().await);
    }

    #[tokio::test]
    async fn test_unscripted_reply_is_not_a_forecast() {
        let completion = MockBackend::new()
            .complete(&CompletionRequest::new("x", 10))
            .await
            .unwrap();
        assert!(crate::ai::parsing::parse_forecast_rows(&completion.text).is_err());
    }
}
