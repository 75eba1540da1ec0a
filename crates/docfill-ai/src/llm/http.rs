//! OpenAI-compatible chat completions provider
//!
//! Non-streaming calls read `choices[0].message.content`. Streaming calls
//! read Server-Sent Events (`data: {...}` lines, terminated by
//! `data: [DONE]`) and forward each `choices[0].delta.content` fragment.

use super::{LlmConfig, LlmService};
use crate::error::{AiResult, AiServiceError};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Parsed SSE line
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Text(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => event
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|t| !t.is_empty())
            .map_or(SseLine::Skip, SseLine::Text),
        Err(_) => SseLine::Skip,
    }
}

/// HTTP chat-completions client
#[derive(Debug, Clone)]
pub struct HttpLlm {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl HttpLlm {
    /// Create a client with an explicit key
    ///
    /// # Errors
    /// `AiServiceError::Http` if the HTTP client cannot be built
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> AiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Create a client reading the key from `config.api_key_env`
    ///
    /// # Errors
    /// `AiServiceError::Unavailable` when the variable is unset or empty
    pub fn from_config(config: &LlmConfig) -> AiResult<Self> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AiServiceError::Unavailable(format!("{} is not set", config.api_key_env))
            })?;
        Self::new(config, key)
    }

    fn request<'a>(&'a self, prompt: &'a str, system: Option<&'a str>, stream: bool) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream,
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> AiResult<reqwest::Response> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmService for HttpLlm {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
        let response = self.send(&self.request(prompt, system, false)).await?;
        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiServiceError::InvalidResponse("response has no content".to_string()))
    }

    async fn stream(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> AiResult<BoxStream<'static, AiResult<String>>> {
        let response = self.send(&self.request(prompt, system, true)).await?;
        let (tx, rx) = mpsc::channel::<AiResult<String>>(64);

        let mut bytes = Box::pin(response.bytes_stream());
        tokio::spawn(async move {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(data) => {
                        buffer.push_str(&String::from_utf8_lossy(&data));
                        while let Some(pos) = buffer.find('\n') {
                            let line: String = buffer.drain(..=pos).collect();
                            match parse_sse_line(line.trim()) {
                                SseLine::Text(text) => {
                                    if tx.send(Ok(text)).await.is_err() {
                                        return;
                                    }
                                }
                                SseLine::Done => return,
                                SseLine::Skip => {}
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Err(err.into())).await;
                        return;
                    }
                }
            }
        });

        Ok(ReceiverStream { rx }.boxed())
    }
}

/// Adapts an mpsc receiver into a `Stream`
struct ReceiverStream {
    rx: mpsc::Receiver<AiResult<String>>,
}

impl Stream for ReceiverStream {
    type Item = AiResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_lines() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#),
            SseLine::Text("Hel".to_string())
        );
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line(r#"data: {"choices":[{"delta":{}}]}"#), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line("data: not json"), SseLine::Skip);
    }

    #[test]
    fn request_includes_system_first() {
        let llm = HttpLlm::new(&LlmConfig::default(), "key").unwrap();
        let body = serde_json::to_value(llm.request("hi", Some("be brief"), false)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[test]
    fn from_config_requires_key() {
        let config = LlmConfig {
            api_key_env: "DOCFILL_UNSET_KEY_FOR_TESTS".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            HttpLlm::from_config(&config),
            Err(AiServiceError::Unavailable(_))
        ));
    }
}
