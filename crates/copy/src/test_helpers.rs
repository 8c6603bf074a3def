//! Stub models shared by unit tests.

use async_trait::async_trait;
use marketeer_core::error::ModelError;
use marketeer_core::message::ChatMessage;
use marketeer_core::model::ChatModel;
use std::sync::Mutex;
use std::time::Duration;

/// Returns scripted replies in order and records every message list it saw.
///
/// Panics if more calls are made than replies provided.
pub struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        let mut replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn single(reply: &str) -> Self {
        Self::new([reply])
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let reply = self.replies.lock().unwrap().pop();
        Ok(reply.unwrap_or_else(|| {
            panic!("ScriptedModel: no more replies (call #{})", self.call_count())
        }))
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingModel;

#[async_trait]
impl ChatModel for HangingModel {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, ModelError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

/// Always fails with the given error.
pub struct FailingModel(pub ModelError);

#[async_trait]
impl ChatModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, ModelError> {
        Err(self.0.clone())
    }
}
