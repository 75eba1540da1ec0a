//! Scripted provider for deterministic tests
//!
//! Responses are queued and consumed in order. An empty queue behaves like
//! an unavailable service, which exercises every fallback path.

use super::{unavailable, LlmService};
use crate::error::{AiResult, AiServiceError};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Fail(String),
}

/// Provider that replays queued responses
#[derive(Debug, Clone, Default)]
pub struct ScriptedLlm {
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push_response(text);
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.push_failure(reason);
        self
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.queue.lock().push_back(Scripted::Text(text.into()));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.queue.lock().push_back(Scripted::Fail(reason.into()));
    }

    /// Prompts received so far, in call order
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of calls made
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Responses still queued
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }

    fn next(&self, prompt: &str) -> AiResult<String> {
        self.prompts.lock().push(prompt.to_string());
        match self.queue.lock().pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail(reason)) => Err(AiServiceError::Http(reason)),
            None => Err(unavailable("script exhausted")),
        }
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, _system: Option<&str>) -> AiResult<String> {
        self.next(prompt)
    }

    async fn stream(
        &self,
        prompt: &str,
        _system: Option<&str>,
    ) -> AiResult<BoxStream<'static, AiResult<String>>> {
        let text = self.next(prompt)?;
        let chunks: Vec<AiResult<String>> = text
            .split_inclusive(' ')
            .map(|chunk| Ok(chunk.to_string()))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_exhausts() {
        let llm = ScriptedLlm::new().with_response("one").with_failure("boom");
        assert_eq!(llm.complete("a", None).await.unwrap(), "one");
        assert!(matches!(llm.complete("b", None).await, Err(AiServiceError::Http(_))));
        assert!(matches!(
            llm.complete("c", Some("sys")).await,
            Err(AiServiceError::Unavailable(_))
        ));
        assert_eq!(llm.prompts(), vec!["a", "b", "c"]);
        assert_eq!(llm.remaining(), 0);
    }

    #[tokio::test]
    async fn streams_word_chunks() {
        let llm = ScriptedLlm::new().with_response("a b c");
        let chunks: Vec<String> = llm
            .stream("p", None)
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["a ", "b ", "c"]);
    }
}
