//! Error types for docfill core
//!
//! Covers:
//! - Structural input failures (parse, generation)
//! - Answers that fail legal-grade validation at export
//! - Missing or expired sessions
//! - Configuration loading
//!
//! Per-turn validation outcomes are never errors; they travel as
//! [`ValidationResult`] data. Only export turns a failed result into
//! [`DocfillError::Validation`].

use crate::session::SessionId;
use docfill_document::{GenerationError, ParseError};
use docfill_validation::ValidationResult;

/// Main docfill error type
#[derive(Debug, thiserror::Error)]
pub enum DocfillError {
    /// Uploaded buffer is not a readable template
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Output document could not be produced
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Answers failed legal-grade validation; nothing was generated
    #[error("{} answer(s) failed validation", .0.errors.len())]
    Validation(ValidationResult),

    /// No session with this id (expired, evicted or never created)
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl DocfillError {
    /// Whether the user can fix this without restarting the upload
    #[inline]
    #[must_use]
    pub fn is_user_recoverable(&self) -> bool {
        match self {
            Self::Generation(GenerationError::MissingTags { .. }) | Self::Validation(_) => true,
            Self::Parse(_) | Self::Generation(_) | Self::SessionNotFound(_) | Self::Config(_) => false,
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_FAILED",
            Self::Generation(err) => err.code(),
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Config(_) => "CONFIG_INVALID",
        }
    }
}

impl From<toml::de::Error> for DocfillError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for docfill core operations
pub type DocfillResult<T> = Result<T, DocfillError>;
