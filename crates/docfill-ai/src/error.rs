//! Error types for AI service calls
//!
//! Every call site that can see one of these has a deterministic fallback,
//! so these errors are logged and absorbed rather than surfaced to users.

/// Failure talking to or interpreting an LLM
#[derive(Debug, thiserror::Error)]
pub enum AiServiceError {
    /// Transport failure or timeout
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the provider
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Response decoded but did not match the expected shape
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// No provider configured, or the provider is out of responses
    #[error("AI service unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for AiServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for AiServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type alias for AI operations
pub type AiResult<T> = Result<T, AiServiceError>;
