//! OpenAI chat completions client

use super::{ChatMessage, ChatModel, Completion, ContentPart, SamplingParams, Usage};
use crate::config::{Env, OPENAI_API_BASE, OPENAI_API_KEY};
use crate::error::{Error, Result};
use crate::http::read_text;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const GPT_4O_MINI: &str = "gpt-4o-mini";
pub const GPT_4O: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub sampling: SamplingParams,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: String, model: &str) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            model: model.to_string(),
            sampling: SamplingParams::default(),
            timeout_secs: 120,
        }
    }

    /// Key from `OPENAI_API_KEY`, base from `OPENAI_API_BASE` when set.
    pub fn from_env(env: &Env, model: &str) -> Result<Self> {
        let mut config = Self::new(env.require(OPENAI_API_KEY)?, model);
        if let Some(base) = env.optional(OPENAI_API_BASE) {
            config.api_base = base;
        }
        Ok(config)
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiChat {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiChat {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(&config.api_base, e))?;

        info!("OpenAI client: model={}", config.model);
        Ok(Self { client, config })
    }
}

/// Plain string content for text-only messages, a part list otherwise.
fn encode_message(message: &ChatMessage) -> Result<Value> {
    if message.is_text_only() {
        return Ok(json!({
            "role": message.role.as_str(),
            "content": message.text(),
        }));
    }

    let mut parts = Vec::with_capacity(message.parts.len());
    for part in &message.parts {
        match part {
            ContentPart::Text(text) => parts.push(json!({"type": "text", "text": text})),
            ContentPart::Image { .. } => {
                let url = part.data_uri().unwrap_or_default();
                parts.push(json!({
                    "type": "image_url",
                    "image_url": {"url": url, "detail": "high"},
                }));
            }
            ContentPart::Audio { mime, .. } => {
                return Err(Error::Unsupported(format!(
                    "{} parts in chat completions",
                    mime
                )))
            }
        }
    }
    Ok(json!({"role": message.role.as_str(), "content": parts}))
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(encode_message)
                .collect::<Result<Vec<_>>>()?,
            temperature: self.config.sampling.temperature,
            top_p: self.config.sampling.top_p,
            max_tokens: self.config.sampling.max_tokens,
            stream: false,
        };

        debug!("Calling OpenAI: {} messages", messages.len());

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        let body = read_text(&url, resp).await?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(Error::EmptyCompletion)?;

        if let Some(usage) = &chat.usage {
            info!(
                "OpenAI response: {} tokens ({} prompt, {} completion)",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }
        debug!("OpenAI answer: {}", text);

        Ok(Completion {
            text,
            model: chat.model,
            usage: chat.usage,
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
