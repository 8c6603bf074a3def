//! Stub models for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use marketeer_core::error::ModelError;
use marketeer_core::message::ChatMessage;
use marketeer_core::model::ChatModel;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replies with a fixed text and counts calls.
pub struct CountingModel {
    reply: String,
    calls: AtomicUsize,
    last: Mutex<Vec<ChatMessage>>,
}

impl CountingModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = messages.to_vec();
        Ok(self.reply.clone())
    }
}

/// Sleeps far past any test timeout.
pub struct HangingModel;

#[async_trait]
impl ChatModel for HangingModel {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, ModelError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("never seen".into())
    }
}
