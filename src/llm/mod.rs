//! Model providers
//!
//! Every exercise talks to exactly one provider through [`ChatModel`]:
//! - `openai`: hosted chat completions (text + base64 images)
//! - `gemini`: hosted generateContent (text, inline images and audio)
//! - `ollama`: local chat server (text only)
//!
//! `transcribe` wraps the hosted speech-to-text endpoint.

pub mod gemini;
pub mod message;
pub mod ollama;
pub mod openai;
pub mod transcribe;

pub use gemini::GeminiChat;
pub use message::{ChatMessage, ContentPart, Role};
pub use ollama::OllamaChat;
pub use openai::OpenAiChat;
pub use transcribe::Transcriber;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fixed sampling parameters of one exercise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl SamplingParams {
    pub fn deterministic() -> Self {
        Self {
            temperature: Some(0.0),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Text of the first choice plus metadata that is only ever logged.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub usage: Option<Usage>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for std::sync::Arc<T> {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        (**self).complete(messages).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Test double returning scripted replies in order.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    pub struct ScriptedModel {
        replies: Mutex<std::collections::VecDeque<String>>,
        pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let text = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(Error::EmptyCompletion)?;
            Ok(Completion {
                text,
                model: "scripted".to_string(),
                usage: None,
            })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
