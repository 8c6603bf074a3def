//! OpenAI-compatible chat backend.
//!
//! Works with: the Hugging Face inference router, OpenAI, Ollama, vLLM,
//! text-generation-inference, and any endpoint exposing
//! `/v1/chat/completions`.
//!
//! Supports non-streaming completions and SSE streaming. A streamed reply is
//! only returned once the backend signals the end of the stream; a stream
//! that stops early is reported as [`ModelError::StreamInterrupted`].

use async_trait::async_trait;
use futures::StreamExt;
use marketeer_core::error::ModelError;
use marketeer_core::message::{ChatMessage, Role};
use marketeer_core::model::{ChatModel, SamplingParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// An OpenAI-compatible chat backend.
pub struct OpenAiCompatModel {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    sampling: SamplingParams,
    stream: bool,
    directive_as_user: bool,
    client: reqwest::Client,
}

impl OpenAiCompatModel {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ModelError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            sampling: SamplingParams::default(),
            stream: false,
            directive_as_user: false,
            client,
        })
    }

    /// Hugging Face inference router (convenience constructor).
    pub fn huggingface(token: impl Into<String>, model: impl Into<String>) -> Result<Self, ModelError> {
        Self::new("huggingface", "https://router.huggingface.co/v1", token, model)
    }

    /// OpenAI (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ModelError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Ollama (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Result<Self, ModelError> {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Send the directive as a user turn and merge adjacent same-role
    /// messages, for chat templates that only accept alternating
    /// user/assistant roles.
    pub fn with_directive_as_user(mut self, enabled: bool) -> Self {
        self.directive_as_user = enabled;
        self
    }

    /// Convert our messages to the OpenAI wire format.
    fn to_api_messages(messages: &[ChatMessage], directive_as_user: bool) -> Vec<ApiMessage> {
        let mut out: Vec<ApiMessage> = Vec::with_capacity(messages.len());
        for m in messages {
            let role = match (m.role, directive_as_user) {
                (Role::Directive, true) | (Role::User, _) => "user",
                (Role::Directive, false) => "system",
                (Role::Assistant, _) => "assistant",
            };

            if directive_as_user {
                if let Some(last) = out.last_mut().filter(|last| last.role == role) {
                    let merged = last.content.get_or_insert_with(String::new);
                    merged.push_str("\n\n");
                    merged.push_str(&m.content);
                    continue;
                }
            }

            out.push(ApiMessage {
                role: role.into(),
                content: Some(m.content.clone()),
            });
        }
        out
    }

    fn request_body(&self, messages: &[ChatMessage], stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(messages, self.directive_as_user),
            "temperature": self.sampling.temperature,
            "top_p": self.sampling.top_p,
            "max_tokens": self.sampling.max_tokens,
            "stream": stream,
        });
        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }
        body
    }

    async fn send(&self, body: &serde_json::Value) -> Result<reqwest::Response, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(e.to_string())
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        match status {
            200 => Ok(response),
            429 => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5);
                Err(ModelError::RateLimited { retry_after_secs })
            }
            401 | 403 => Err(ModelError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            )),
            404 => Err(ModelError::ModelNotFound(self.model.clone())),
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                warn!(status, body = %error_body, "Backend returned error");
                Err(ModelError::ApiError {
                    status_code: status,
                    message: error_body,
                })
            }
        }
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let body = self.request_body(messages, false);
        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let response = self.send(&body).await?;
        let api_response: ApiResponse =
            response.json().await.map_err(|e| ModelError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        if let Some(usage) = &api_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn complete_streaming(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let body = self.request_body(messages, true);
        debug!(backend = %self.name, model = %self.model, "Sending streaming request");

        let response = self.send(&body).await?;
        let mut byte_stream = response.bytes_stream();
        let mut acc = StreamAccumulator::default();

        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|e| ModelError::StreamInterrupted(e.to_string()))?;
            acc.feed(&bytes);
            if acc.is_finished() {
                break;
            }
        }

        acc.finish()
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        if self.stream {
            self.complete_streaming(messages).await
        } else {
            self.complete(messages).await
        }
    }

    async fn health_check(&self) -> Result<bool, ModelError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- SSE accumulation ---

/// Collects `data:` lines of an SSE completion stream into the full reply.
///
/// Network chunks can split a multi-byte character, so bytes are buffered
/// and only complete lines are decoded. The text is only released by
/// [`StreamAccumulator::finish`] once the stream has been terminated by
/// `[DONE]` or a `finish_reason`.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    buffer: Vec<u8>,
    content: String,
    finished: bool,
}

impl StreamAccumulator {
    /// Feed raw bytes from the wire.
    pub(crate) fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw[..line_end]);
            let line = line.trim_end_matches('\r');

            if self.finished || line.is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                self.finished = true;
                continue;
            }

            match serde_json::from_str::<StreamResponse>(data) {
                Ok(resp) => {
                    for choice in resp.choices {
                        if let Some(text) = choice.delta.content {
                            self.content.push_str(&text);
                        }
                        if choice.finish_reason.is_some() {
                            self.finished = true;
                        }
                    }
                }
                Err(e) => {
                    trace!(data = %data, error = %e, "Ignoring unparseable SSE chunk");
                }
            }
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// The complete reply, or an error if the stream never finished.
    pub(crate) fn finish(self) -> Result<String, ModelError> {
        if self.finished {
            Ok(self.content)
        } else {
            Err(ModelError::StreamInterrupted(format!(
                "stream ended before completion after {} characters",
                self.content.chars().count()
            )))
        }
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::directive("You write posts."),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello!"),
            ChatMessage::user("make it punchier"),
            ChatMessage::user("add an emoji"),
        ]
    }

    #[test]
    fn directive_maps_to_system_role() {
        let api = OpenAiCompatModel::to_api_messages(&sample_messages(), false);
        let roles: Vec<_> = api.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user", "user"]);
    }

    #[test]
    fn directive_as_user_merges_adjacent_roles() {
        let api = OpenAiCompatModel::to_api_messages(&sample_messages(), true);
        let roles: Vec<_> = api.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(api[0].content.as_deref(), Some("You write posts.\n\nhi"));
        assert_eq!(
            api[2].content.as_deref(),
            Some("make it punchier\n\nadd an emoji")
        );
    }

    #[test]
    fn request_body_carries_sampling() {
        let model = OpenAiCompatModel::ollama(None, "llama3.2")
            .unwrap()
            .with_sampling(SamplingParams {
                temperature: 0.3,
                top_p: 0.5,
                max_tokens: 64,
            });
        let body = model.request_body(&sample_messages(), false);
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["stream"], false);
        assert!(body.get("stream_options").is_none());

        let body = model.request_body(&sample_messages(), true);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let model = OpenAiCompatModel::new("custom", "http://localhost:8080/v1/", "k", "m").unwrap();
        assert_eq!(model.base_url, "http://localhost:8080/v1");
        assert_eq!(model.name(), "custom");
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "id": "chatcmpl-1",
            "model": "google/gemma-2-2b-it",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Sip into the weekend."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Sip into the weekend.")
        );
        assert_eq!(parsed.usage.unwrap().completion_tokens, 5);
    }

    #[test]
    fn accumulator_joins_deltas_until_done() {
        let mut acc = StreamAccumulator::default();
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Sip \"}}]}\n\n");
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"slow\"}}]}\n");
        assert!(!acc.is_finished());
        acc.feed(b"\ndata: [DONE]\n\n");
        assert!(acc.is_finished());
        assert_eq!(acc.finish().unwrap(), "Sip slow");
    }

    #[test]
    fn accumulator_handles_split_lines() {
        let mut acc = StreamAccumulator::default();
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"con");
        acc.feed(b"tent\":\"Hello\"},\"finish_reason\":\"stop\"}]}\r\n");
        assert!(acc.is_finished());
        assert_eq!(acc.finish().unwrap(), "Hello");
    }

    #[test]
    fn accumulator_keeps_characters_split_across_chunks() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"Fall 🎃\"},\"finish_reason\":\"stop\"}]}\n";
        let bytes = line.as_bytes();
        let split = line.find('🎃').unwrap() + 2;

        let mut acc = StreamAccumulator::default();
        acc.feed(&bytes[..split]);
        assert!(!acc.is_finished());
        acc.feed(&bytes[split..]);
        assert_eq!(acc.finish().unwrap(), "Fall 🎃");
    }

    #[test]
    fn accumulator_skips_comments_and_garbage() {
        let mut acc = StreamAccumulator::default();
        acc.feed(b": keep-alive\n");
        acc.feed(b"data: not json\n");
        acc.feed(b"event: ping\n");
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n");
        acc.feed(b"data: [DONE]\n");
        assert_eq!(acc.finish().unwrap(), "ok");
    }

    #[test]
    fn unfinished_stream_is_an_error() {
        let mut acc = StreamAccumulator::default();
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"partial post\"}}]}\n");
        match acc.finish() {
            Err(ModelError::StreamInterrupted(reason)) => assert!(reason.contains("12")),
            other => panic!("Expected StreamInterrupted, got: {other:?}"),
        }
    }

    #[test]
    fn nothing_after_done_is_collected() {
        let mut acc = StreamAccumulator::default();
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\ndata: [DONE]\n");
        acc.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n");
        assert_eq!(acc.finish().unwrap(), "a");
    }
}
