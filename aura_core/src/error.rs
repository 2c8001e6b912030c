use std::time::Duration;

use thiserror::Error;

/// Failures of a generation call. All of them are recoverable by the turn
/// manager, which answers with the fallback reply instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Generation API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation quota exhausted: {0}")]
    Quota(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("Empty response from generation service")]
    EmptyResponse,

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// Short machine-friendly label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Api { .. } => "api",
            Self::Quota(_) => "quota",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyResponse => "empty_response",
            Self::Timeout(_) => "timeout",
        }
    }
}
