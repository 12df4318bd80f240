//! Pipeline error types

use thiserror::Error;

/// Conditions that end a run without an itinerary
///
/// Everything after Stage 1 degrades to a fallback instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Stage 1 could not produce a usable query; the user should rephrase
    #[error("Could not understand the trip request. Please be more specific. {reason}")]
    Understand { reason: String },

    /// The request was rejected before parsing
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Internal pipeline error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn understand(reason: impl Into<String>) -> Self {
        Self::Understand { reason: reason.into() }
    }

    /// Whether the user can fix this by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Understand { .. } | Self::InvalidInput(_))
    }
}
