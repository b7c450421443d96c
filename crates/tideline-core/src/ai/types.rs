//! AI backend request and response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Rendered user prompt
    pub prompt: String,
    /// Optional system instructions
    pub system: Option<String>,
    /// Output token ceiling sent to the provider
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens,
            temperature: 0.2,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Why the provider stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Natural end of output
    Stop,
    /// Output was cut at the token limit
    Length,
    /// Anything else the provider reported
    Other(String),
}

impl FinishReason {
    /// Map a provider's stop/finish/done reason string
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            None | Some("stop") | Some("end_turn") | Some("eos") => Self::Stop,
            Some("length") | Some("max_tokens") => Self::Length,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// Raw text produced by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish: FinishReason,
}

impl Completion {
    pub fn stop(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: FinishReason::Stop,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.finish == FinishReason::Length
    }
}
