//! Conversation transcript

use tracing::debug;

use crate::llm::{Message, Role};

/// Ordered, append-only message history of one interview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Transcript seeded with the persona instruction and opening line
    pub fn seeded(system: impl Into<String>, opening: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::assistant(opening)],
        }
    }

    pub fn push(&mut self, message: Message) {
        debug!(role = %message.role(), len = self.messages.len(), "Transcript::push: called");
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user messages so far
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role() == Role::User).count()
    }

    /// Transcript followed by `extra`, as one request's message list
    pub fn followed_by(&self, extra: impl IntoIterator<Item = Message>) -> Vec<Message> {
        self.messages.iter().cloned().chain(extra).collect()
    }

    /// One `"<Role>: <content>"` line per message
    pub fn flatten(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role().label(), m.content()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
