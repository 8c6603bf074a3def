//! ChatModel trait: the abstraction over text-generation backends.
//!
//! A ChatModel takes an ordered list of role-tagged messages and returns the
//! generated text. Whether that runs on a hosted endpoint, a local server or a
//! test stub is invisible to the rest of the system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::message::ChatMessage;

/// Sampling parameters passed to a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Temperature (0.0 = deterministic, higher = more creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum new tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    256
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// The core model trait.
///
/// The orchestrator calls `generate()` exactly once per turn and never sees
/// partial output: implementations that stream must only return once the
/// backend has signalled completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A human-readable name for this backend (e.g., "huggingface", "ollama").
    fn name(&self) -> &str;

    /// Generate a reply for the given messages.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> Result<bool, ModelError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
            Ok(messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default())
        }
    }

    #[test]
    fn sampling_defaults() {
        let params = SamplingParams::default();
        assert!((params.temperature - 0.8).abs() < f32::EPSILON);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(params.max_tokens, 256);
    }

    #[test]
    fn sampling_partial_deserialize() {
        let params: SamplingParams = serde_json::from_str(r#"{"temperature":0.2}"#).unwrap();
        assert!((params.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(params.max_tokens, 256);
    }

    #[tokio::test]
    async fn trait_object_dispatch() {
        let model: Box<dyn ChatModel> = Box::new(EchoModel);
        let out = model
            .generate(&[ChatMessage::directive("d"), ChatMessage::user("ping")])
            .await
            .unwrap();
        assert_eq!(out, "ping");
        assert!(model.health_check().await.unwrap());
        assert_eq!(model.name(), "echo");
    }
}
