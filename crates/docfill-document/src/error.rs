//! Error types for the document layer
//!
//! Provides error handling for:
//! - Container operations (bytes ⇄ archive parts)
//! - Parse operations (template buffer → fields)
//! - Generation operations (template + values → output buffer)

/// Errors reading or writing the docx archive
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Buffer is not a readable zip archive
    #[error("not a valid document container: {0}")]
    InvalidArchive(String),

    /// Required part is absent
    #[error("missing document part: {0}")]
    MissingPart(String),

    /// Part is not valid UTF-8 XML text
    #[error("document part {part} is not valid UTF-8")]
    Encoding { part: String },

    /// Archive entry could not be read
    #[error("io error on {part}: {source}")]
    Io {
        part: String,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be written
    #[error("failed to write archive: {0}")]
    Write(String),
}

impl ContainerError {
    /// Create IO error for part
    pub fn io_error(part: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            part: part.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for ContainerError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::InvalidArchive(err.to_string())
    }
}

/// Errors during template parsing (ingress)
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Empty input buffer
    #[error("document buffer is empty")]
    Empty,

    /// Buffer exceeds configured limit
    #[error("document too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// Container could not be opened or is structurally broken
    #[error("unreadable document: {0}")]
    Container(#[from] ContainerError),
}

/// Errors during document generation (egress)
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Template buffer is not a readable document
    #[error("invalid template: {0}")]
    InvalidTemplate(#[source] ContainerError),

    /// One or more leaf tags have no bound value
    #[error("missing values for tags: {}", tags.join(", "))]
    MissingTags { tags: Vec<String> },

    /// Rendering failed
    #[error("render failed: {0}")]
    Render(String),

    /// Output archive could not be written
    #[error("serialization failed: {0}")]
    Serialize(#[source] ContainerError),
}

impl GenerationError {
    /// Stable machine-readable code
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTemplate(_) => "TEMPLATE_INVALID",
            Self::MissingTags { .. } => "MISSING_TAGS",
            Self::Render(_) => "RENDER_FAILED",
            Self::Serialize(_) => "SERIALIZE_FAILED",
        }
    }

    /// Tag names lacking values, empty for other variants
    #[must_use]
    pub fn missing_tags(&self) -> &[String] {
        match self {
            Self::MissingTags { tags } => tags,
            _ => &[],
        }
    }
}

/// Combined document layer error
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
