//! LLM service abstraction
//!
//! The core only ever needs plain text in and plain text out, either whole
//! or streamed. Providers:
//! - [`HttpLlm`]: OpenAI-compatible chat completions over HTTP
//! - [`NoopLlm`]: always unavailable; used when no key is configured
//! - [`ScriptedLlm`]: queued responses for deterministic tests

mod http;
mod noop;
mod scripted;

pub use http::HttpLlm;
pub use noop::NoopLlm;
pub use scripted::ScriptedLlm;

use crate::error::{AiResult, AiServiceError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text completion service
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Complete `prompt`, optionally under a system instruction
    async fn complete(&self, prompt: &str, system: Option<&str>) -> AiResult<String>;

    /// Stream the completion as incremental text chunks
    async fn stream(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> AiResult<BoxStream<'static, AiResult<String>>>;
}

/// Drain a stream into one string, failing on the first chunk error
///
/// # Errors
/// The first error yielded by the stream
pub async fn collect_stream(mut stream: BoxStream<'static, AiResult<String>>) -> AiResult<String> {
    let mut out = String::new();
    while let Some(chunk) = stream.next().await {
        out.push_str(&chunk?);
    }
    Ok(out)
}

/// Provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// Build the configured provider, or [`NoopLlm`] when no API key is set
#[must_use]
pub fn build_service(config: &LlmConfig) -> Arc<dyn LlmService> {
    match HttpLlm::from_config(config) {
        Ok(llm) => {
            tracing::info!(model = %config.model, "LLM provider configured");
            Arc::new(llm)
        }
        Err(err) => {
            tracing::warn!(error = %err, "LLM disabled, using deterministic fallbacks");
            Arc::new(NoopLlm)
        }
    }
}

pub(crate) fn unavailable(reason: impl Into<String>) -> AiServiceError {
    AiServiceError::Unavailable(reason.into())
}
