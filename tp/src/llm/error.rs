//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors from building or calling an LLM client
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("API key missing: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Unknown LLM provider: '{0}'. Supported: openai, gemini")]
    UnknownProvider(String),
}

impl LlmError {
    /// Whether the same request might succeed later
    ///
    /// Setup problems (key, provider, templates) and undecodable output never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) => true,
            Self::ApiError { status, .. } => *status == 408 || *status >= 500,
            Self::InvalidResponse(_)
            | Self::Json(_)
            | Self::Template(_)
            | Self::MissingApiKey(_)
            | Self::UnknownProvider(_) => false,
        }
    }

    /// Server-requested wait, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
