//! Runtime configuration
//!
//! Loaded from TOML, then overridden by `DOCFILL_*` environment variables.
//! Every key is optional; missing keys take the [`Default`] value.
//!
//! ```toml
//! max_document_bytes = 5242880
//! session_ttl_secs = 1800
//!
//! [llm]
//! model = "gpt-4o-mini"
//! ```

use crate::error::{DocfillError, DocfillResult};
use docfill_ai::{EnrichmentCache, LlmConfig};
use docfill_document::{GenerateOptions, DEFAULT_MAX_DOCUMENT_BYTES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Docfill configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfillConfig {
    /// Largest accepted template upload
    pub max_document_bytes: usize,
    /// Idle age after which sessions are swept
    pub session_ttl_secs: u64,
    pub enrichment_cache_capacity: u64,
    pub enrichment_cache_ttl_secs: u64,
    /// Deflate level for generated documents (0-9)
    pub compression_level: u32,
    pub include_audit_log: bool,
    pub llm: LlmConfig,
}

impl Default for DocfillConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            session_ttl_secs: 3_600,
            enrichment_cache_capacity: 1_000,
            enrichment_cache_ttl_secs: 86_400,
            compression_level: 6,
            include_audit_log: true,
            llm: LlmConfig::default(),
        }
    }
}

impl DocfillConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// `Config` when the text is not valid TOML for this schema
    pub fn from_toml_str(text: &str) -> DocfillResult<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config.normalized())
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `Config` when the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> DocfillResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DocfillError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `DOCFILL_*` variables from the process environment
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `DOCFILL_*` overrides from any lookup. Unparseable values are
    /// logged and ignored.
    #[must_use]
    pub fn apply_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        override_parsed(&lookup, "DOCFILL_MAX_DOCUMENT_BYTES", &mut self.max_document_bytes);
        override_parsed(&lookup, "DOCFILL_SESSION_TTL_SECS", &mut self.session_ttl_secs);
        override_parsed(&lookup, "DOCFILL_COMPRESSION_LEVEL", &mut self.compression_level);
        override_parsed(&lookup, "DOCFILL_INCLUDE_AUDIT_LOG", &mut self.include_audit_log);
        override_parsed(&lookup, "DOCFILL_LLM_TIMEOUT_SECS", &mut self.llm.timeout_secs);
        if let Some(endpoint) = lookup("DOCFILL_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = lookup("DOCFILL_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key_env) = lookup("DOCFILL_LLM_API_KEY_ENV") {
            self.llm.api_key_env = key_env;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.compression_level = self.compression_level.min(9);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// With compression level, clamped to 9
    #[inline]
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_audit_log(mut self, include: bool) -> Self {
        self.include_audit_log = include;
        self
    }

    #[inline]
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Generator options implied by this configuration
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::default()
            .with_compression_level(self.compression_level)
            .with_audit_log(self.include_audit_log)
    }

    /// Fresh enrichment cache sized by this configuration
    #[must_use]
    pub fn enrichment_cache(&self) -> EnrichmentCache {
        EnrichmentCache::with_ttl(
            self.enrichment_cache_capacity,
            Duration::from_secs(self.enrichment_cache_ttl_secs),
        )
    }
}

fn override_parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T)
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(err) => tracing::warn!(key, value = %raw, error = %err, "ignoring invalid override"),
    }
}
