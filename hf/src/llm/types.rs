//! Chat-completion request/response types
//!
//! These model the OpenAI Chat Completions contract closely enough that the
//! wire format falls straight out of serde, while staying small enough for a
//! scripted mock to satisfy in tests.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Temperature used for tag extraction
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized display label, e.g. "Assistant"
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single chat message
///
/// Serializes to `{"role": "...", "content": "..."}` so a `Vec<Message>` is
/// already the `messages` array the API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        debug!("Message::system: called");
        Message::System(text.into())
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Message::User(text.into())
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Message::Assistant(text.into())
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(text) | Message::User(text) | Message::Assistant(text) => text,
        }
    }
}

/// A completion request - everything needed for one model call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Ordered conversation, system instructions included
    pub messages: Vec<Message>,

    /// Sampling temperature
    pub temperature: f32,

    /// Response budget; `None` defers to the client's configured limit
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Request in the exploratory regime (conversation, disambiguation, composition)
    pub fn conversational(messages: Vec<Message>, temperature: f32) -> Self {
        debug!(message_count = %messages.len(), %temperature, "CompletionRequest::conversational: called");
        Self {
            messages,
            temperature,
            max_tokens: None,
        }
    }

    /// Request at temperature zero (tag extraction)
    pub fn deterministic(messages: Vec<Message>) -> Self {
        debug!(message_count = %messages.len(), "CompletionRequest::deterministic: called");
        Self {
            messages,
            temperature: DETERMINISTIC_TEMPERATURE,
            max_tokens: None,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Plain text response, mostly for tests and mocks
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// Trimmed reply text; a missing body reads as empty
    pub fn text_or_empty(&self) -> String {
        self.content.as_deref().map(str::trim).unwrap_or_default().to_string()
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ContentFilter,
}

impl StopReason {
    /// Parse from an OpenAI `finish_reason`
    pub fn from_openai(s: Option<&str>) -> Self {
        match s {
            Some("length") => StopReason::MaxTokens,
            Some("content_filter") => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        }
    }
}

/// Token usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_as_role_and_content() {
        let json = serde_json::to_value(Message::assistant("Hi there")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Hi there"}));
    }

    #[test]
    fn test_message_deserializes_known_roles_only() {
        let msg: Message = serde_json::from_str(r#"{"role":"system","content":"be brief"}"#).unwrap();
        assert_eq!(msg, Message::system("be brief"));

        let bad = serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_message_role_and_content() {
        let msg = Message::user("Somewhere quiet");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "Somewhere quiet");
        assert_eq!(msg.role().label(), "User");
    }

    #[test]
    fn test_deterministic_request_has_zero_temperature() {
        let req = CompletionRequest::deterministic(vec![Message::user("x")]);
        assert_eq!(req.temperature, 0.0);

        let req = CompletionRequest::conversational(vec![], 0.7);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_or_empty() {
        assert_eq!(CompletionResponse::text("  Mountain Lodge \n").text_or_empty(), "Mountain Lodge");

        let empty = CompletionResponse {
            content: None,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        };
        assert_eq!(empty.text_or_empty(), "");
    }

    #[test]
    fn test_stop_reason_from_openai() {
        assert_eq!(StopReason::from_openai(Some("stop")), StopReason::EndTurn);
        assert_eq!(StopReason::from_openai(Some("length")), StopReason::MaxTokens);
        assert_eq!(StopReason::from_openai(Some("content_filter")), StopReason::ContentFilter);
        assert_eq!(StopReason::from_openai(None), StopReason::EndTurn);
    }
}
