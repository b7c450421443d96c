//! Error types for Tideline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("AI provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("AI request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("AI response truncated at the token limit ({max_tokens} tokens)")]
    Truncated { max_tokens: u32 },

    #[error("Unparseable AI response: {0}")]
    AiResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Provider failures (deadline, transport, error status) as opposed to bad output
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Http(_) | Error::Provider { .. }
        )
    }
}
