//! Shared helpers for integration tests

#![allow(dead_code)]

use aidevs_tasks::centrala::Centrala;
use aidevs_tasks::config::Credentials;
use aidevs_tasks::http::HttpClient;
use aidevs_tasks::llm::{ChatMessage, ChatModel, Completion};
use aidevs_tasks::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const API_KEY: &str = "test-key";

/// Model answering from a fixed list and recording every prompt it saw.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
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

    pub fn prompt(&self, call: usize) -> Vec<ChatMessage> {
        self.seen.lock().unwrap()[call].clone()
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

/// Model that always fails, for error paths.
pub struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<Completion> {
        Err(Error::EmptyCompletion)
    }

    fn model(&self) -> &str {
        "failing"
    }
}

pub fn centrala(base_url: String) -> Centrala {
    Centrala::new(
        HttpClient::new().unwrap(),
        Credentials {
            host: base_url,
            api_key: API_KEY.to_string(),
        },
    )
}
