//! Message and chat-history domain types.
//!
//! These are the value objects that flow between the assembler, the model
//! backend and the caller: history turns come in, a [`GenerationRequest`]
//! goes out to the model.

use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Campaign and platform instructions, always first
    Directive,
    /// The person writing the campaign
    User,
    /// The model
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Directive => write!(f, "directive"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a directive message.
    pub fn directive(content: impl Into<String>) -> Self {
        Self {
            role: Role::Directive,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One exchange in a session. Either side may be absent, e.g. the latest
/// turn before a reply exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
}

impl ChatTurn {
    /// A complete exchange.
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            assistant: Some(assistant.into()),
        }
    }

    /// A turn with only the user side.
    pub fn user_only(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            assistant: None,
        }
    }

    /// A turn with only the assistant side.
    pub fn assistant_only(assistant: impl Into<String>) -> Self {
        Self {
            user: None,
            assistant: Some(assistant.into()),
        }
    }

    /// Expand into zero, one or two messages, user first. Every side that
    /// is present becomes a message, verbatim.
    pub fn messages(&self) -> impl Iterator<Item = ChatMessage> + '_ {
        let user = self.user.as_deref().map(ChatMessage::user);
        let assistant = self.assistant.as_deref().map(ChatMessage::assistant);
        user.into_iter().chain(assistant)
    }
}

/// The fully assembled payload for one model call.
///
/// Always shaped `[directive, history..., new user message]`. Construct it
/// through the context assembler; the fields are read-only from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    messages: Vec<ChatMessage>,
}

impl GenerationRequest {
    /// Build a request from its three segments.
    pub fn from_parts(
        directive: String,
        history: Vec<ChatMessage>,
        new_user_message: String,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::directive(directive));
        messages.extend(history);
        messages.push(ChatMessage::user(new_user_message));
        Self { messages }
    }

    /// All messages in send order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The directive message (always first).
    pub fn directive(&self) -> &ChatMessage {
        &self.messages[0]
    }

    /// The flattened history between the directive and the new message.
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages[1..self.messages.len() - 1]
    }

    /// The new user message (always last).
    pub fn new_user_message(&self) -> &ChatMessage {
        &self.messages[self.messages.len() - 1]
    }

    /// Total characters across all messages.
    pub fn char_count(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_turn_expands_user_first() {
        let turn = ChatTurn::new("hi", "hello!");
        let msgs: Vec<_> = turn.messages().collect();
        assert_eq!(msgs, vec![ChatMessage::user("hi"), ChatMessage::assistant("hello!")]);
    }

    #[test]
    fn absent_side_contributes_nothing() {
        let msgs: Vec<_> = ChatTurn::user_only("make it punchier").messages().collect();
        assert_eq!(msgs, vec![ChatMessage::user("make it punchier")]);

        let msgs: Vec<_> = ChatTurn::assistant_only("Draft #1").messages().collect();
        assert_eq!(msgs, vec![ChatMessage::assistant("Draft #1")]);

        assert_eq!(ChatTurn::default().messages().count(), 0);
    }

    #[test]
    fn whitespace_side_is_kept_verbatim() {
        let turn = ChatTurn {
            user: Some("   ".into()),
            assistant: Some("ok".into()),
        };
        let msgs: Vec<_> = turn.messages().collect();
        assert_eq!(msgs, vec![ChatMessage::user("   "), ChatMessage::assistant("ok")]);
    }

    #[test]
    fn request_segments() {
        let req = GenerationRequest::from_parts(
            "be brief".into(),
            vec![ChatMessage::user("a"), ChatMessage::assistant("b")],
            "c".into(),
        );
        assert_eq!(req.messages().len(), 4);
        assert_eq!(req.directive().role, Role::Directive);
        assert_eq!(req.history().len(), 2);
        assert_eq!(req.new_user_message(), &ChatMessage::user("c"));
        assert_eq!(req.char_count(), "be brief".len() + 3);
    }

    #[test]
    fn request_without_history() {
        let req = GenerationRequest::from_parts("d".into(), vec![], "u".into());
        assert!(req.history().is_empty());
        assert_eq!(req.messages().len(), 2);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::directive("x")).unwrap();
        assert!(json.contains("\"directive\""));
    }

    #[test]
    fn chat_turn_deserializes_with_missing_side() {
        let turn: ChatTurn = serde_json::from_str(r#"{"user":"hi"}"#).unwrap();
        assert_eq!(turn, ChatTurn::user_only("hi"));
    }
}
