use super::{unavailable, LlmService};
use crate::error::AiResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Provider that is never available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLlm;

#[async_trait]
impl LlmService for NoopLlm {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> AiResult<String> {
        Err(unavailable("no LLM provider configured"))
    }

    async fn stream(
        &self,
        _prompt: &str,
        _system: Option<&str>,
    ) -> AiResult<BoxStream<'static, AiResult<String>>> {
        Err(unavailable("no LLM provider configured"))
    }
}
