//! Tideline Core Library
//!
//! Financial trend engine for a personal budgeting tool:
//! - Database access and migrations
//! - Recurring schedule evaluation with month-end clamping
//! - Historical window, running totals and capital synchronization
//! - AI forecasting through pluggable local backends (Ollama, OpenAI-compatible)
//! - Forecast cache with TTL
//! - Recurring, planned and budget filters layered on the forecast
//! - Goal prediction under realized and budgeted spending

pub mod ai;
pub mod cache;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod prompts;
pub mod schedule;
pub mod source;

/// Test utilities including mock LLM server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, Completion, CompletionRequest, FinishReason, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use cache::{CacheKey, ForecastCacheStore, MemoryForecastCache};
pub use config::{AiSettings, TrendConfig};
pub use currency::{CurrencyConverter, RateTable};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::TrendEngine;
pub use models::*;
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use source::TrendSource;
