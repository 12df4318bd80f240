//! Capability error types

use std::time::Duration;
use thiserror::Error;

use crate::llm::LlmError;

/// Errors a capability call can end with
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed output: {0}")]
    Malformed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Capability task panicked: {0}")]
    Panicked(String),

    #[error("Capability unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for CapabilityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl CapabilityError {
    /// Whether the underlying cause might succeed on a later run
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_retryable(),
            Self::Timeout(_) => true,
            Self::Unavailable(_) => true,
            Self::Malformed(_) | Self::Panicked(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_malformed() {
        let err: CapabilityError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, CapabilityError::Malformed(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(CapabilityError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(CapabilityError::Llm(LlmError::Timeout(Duration::from_secs(1))).is_transient());
        assert!(!CapabilityError::Llm(LlmError::InvalidResponse("x".to_string())).is_transient());
        assert!(!CapabilityError::Panicked("boom".to_string()).is_transient());
    }
}
