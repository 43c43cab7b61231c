//! Prompt assembly
//!
//! A prompt is one system instruction followed by one or more turns. The
//! system message is fixed at construction so it always comes first.

use crate::error::{Error, Result};
use crate::llm::{ChatMessage, ChatModel, Completion, ContentPart, Role};

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    messages: Vec<ChatMessage>,
}

impl Prompt {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system)],
        }
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    pub fn user_parts(mut self, parts: Vec<ContentPart>) -> Self {
        self.messages.push(ChatMessage::user_parts(parts));
        self
    }

    pub fn assistant(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::assistant(content));
        self
    }

    /// Append a turn to a running conversation.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn has_user_turn(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// Send the conversation to `model`. A prompt without a user turn is
    /// rejected before the call.
    pub async fn send<M: ChatModel + ?Sized>(&self, model: &M) -> Result<Completion> {
        if !self.has_user_turn() {
            return Err(Error::EmptyInput("prompt has no user turn".to_string()));
        }
        model.complete(&self.messages).await
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
