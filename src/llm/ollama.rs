//! Local Ollama chat client

use super::{ChatMessage, ChatModel, Completion, Usage};
use crate::config::{Env, OLLAMA_HOST};
use crate::error::{Error, Result};
use crate::http::read_text;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Polish instruction-tuned model served locally.
pub const BIELIK: &str = "SpeakLeash/bielik-11b-v2.2-instruct:Q4_K_M";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OllamaConfig {
    pub fn from_env(env: &Env, model: &str) -> Result<Self> {
        Ok(Self {
            base_url: env.require(OLLAMA_HOST)?,
            model: model.to_string(),
            timeout_secs: 600,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Non-streaming `/api/chat` reply. Timings are in nanoseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub created_at: Option<DateTime<Utc>>,
    pub message: OllamaMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub load_duration: u64,
    #[serde(default)]
    pub prompt_eval_count: u32,
    #[serde(default)]
    pub prompt_eval_duration: u64,
    #[serde(default)]
    pub eval_count: u32,
    #[serde(default)]
    pub eval_duration: u64,
}

pub struct OllamaChat {
    client: Client,
    config: OllamaConfig,
}

impl OllamaChat {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(&config.base_url, e))?;

        info!("Ollama client: model={} host={}", config.model, config.base_url);
        Ok(Self { client, config })
    }
}

fn to_ollama(message: &ChatMessage) -> Result<OllamaMessage> {
    if !message.is_text_only() {
        return Err(Error::Unsupported(
            "binary parts are not supported by the local model".to_string(),
        ));
    }
    Ok(OllamaMessage {
        role: message.role.as_str().to_string(),
        content: message.text(),
    })
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(to_ollama).collect::<Result<Vec<_>>>()?,
            stream: false,
        };

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        let body = read_text(&url, resp).await?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        debug!(
            "Ollama stats: total={}ms load={}ms prompt_eval={} eval={} done={}",
            chat.total_duration / 1_000_000,
            chat.load_duration / 1_000_000,
            chat.prompt_eval_count,
            chat.eval_count,
            chat.done
        );

        if chat.message.content.is_empty() {
            return Err(Error::EmptyCompletion);
        }
        info!("Ollama answer: {}", chat.message.content);

        Ok(Completion {
            text: chat.message.content,
            model: chat.model,
            usage: Some(Usage {
                prompt_tokens: chat.prompt_eval_count,
                completion_tokens: chat.eval_count,
                total_tokens: chat.prompt_eval_count + chat.eval_count,
            }),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_disables_streaming() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/chat")
                .json_body_partial(r#"{"stream": false, "model": "SpeakLeash/bielik-11b-v2.2-instruct:Q4_K_M"}"#);
            then.status(200).json_body(json!({
                "model": BIELIK,
                "created_at": "2024-11-12T10:00:00.123456Z",
                "message": {"role": "assistant", "content": "Osoba CENZURA mieszka w CENZURA."},
                "done": true,
                "total_duration": 5_000_000_000u64,
                "load_duration": 1_000_000,
                "prompt_eval_count": 120,
                "prompt_eval_duration": 2_000_000,
                "eval_count": 12,
                "eval_duration": 3_000_000
            }));
        });

        let chat = OllamaChat::new(OllamaConfig {
            base_url: server.base_url(),
            model: BIELIK.to_string(),
            timeout_secs: 10,
        })
        .unwrap();

        let completion = chat
            .complete(&[ChatMessage::system("Censor"), ChatMessage::user("Jan mieszka w Radomiu.")])
            .await
            .unwrap();
        assert_eq!(completion.text, "Osoba CENZURA mieszka w CENZURA.");
        assert_eq!(completion.usage.unwrap().total_tokens, 132);
        mock.assert();
    }

    #[test]
    fn test_binary_parts_rejected() {
        let msg = ChatMessage::user_parts(vec![crate::llm::ContentPart::png(vec![0])]);
        assert!(to_ollama(&msg).is_err());
    }
}
