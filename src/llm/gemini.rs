//! Gemini generateContent client
//!
//! Unlike chat completions, Gemini accepts audio inline, so exercises that
//! classify recordings go through this provider.

use super::{ChatMessage, ChatModel, Completion, ContentPart, Role, SamplingParams, Usage};
use crate::config::{Env, GEMINI_API_BASE, GEMINI_API_KEY};
use crate::error::{Error, Result};
use crate::http::read_text;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_FLASH: &str = "gemini-2.0-flash-exp";

/// Sampling used by every Gemini exercise.
pub const GEMINI_SAMPLING: SamplingParams = SamplingParams {
    temperature: Some(0.5),
    top_k: Some(40),
    top_p: Some(0.95),
    max_tokens: Some(8192),
};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub sampling: SamplingParams,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn from_env(env: &Env, model: &str) -> Result<Self> {
        Ok(Self {
            api_base: env
                .optional(GEMINI_API_BASE)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: env.require(GEMINI_API_KEY)?,
            model: model.to_string(),
            sampling: GEMINI_SAMPLING,
            timeout_secs: 300,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(alias = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

fn encode_part(part: &ContentPart) -> Part {
    match part {
        ContentPart::Text(text) => Part {
            text: Some(text.clone()),
            inline_data: None,
        },
        ContentPart::Image { mime, data } | ContentPart::Audio { mime, data } => Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime.clone(),
                data: STANDARD.encode(data),
            }),
        },
    }
}

/// System messages become `systemInstruction`, the rest keep their order.
fn build_request(messages: &[ChatMessage], sampling: &SamplingParams) -> GenerateRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in messages {
        let parts: Vec<Part> = message.parts.iter().map(encode_part).collect();
        match message.role {
            Role::System => system_parts.extend(parts),
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts,
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model".to_string()),
                parts,
            }),
        }
    }

    GenerateRequest {
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        },
        contents,
        generation_config: GenerationConfig {
            temperature: sampling.temperature,
            top_k: sampling.top_k,
            top_p: sampling.top_p,
            max_output_tokens: sampling.max_tokens,
        },
    }
}

pub struct GeminiChat {
    client: Client,
    config: GeminiConfig,
}

impl GeminiChat {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(&config.api_base, e))?;

        info!("Gemini client: model={}", config.model);
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        let request = build_request(messages, &self.config.sampling);

        debug!("Calling Gemini: {} contents", request.contents.len());

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        let body = read_text(&url, resp).await?;
        let generated: GenerateResponse = serde_json::from_str(&body)?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or(Error::EmptyCompletion)?;

        let usage = generated.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        if let Some(usage) = &usage {
            info!("Gemini response: {} tokens", usage.total_tokens);
        }

        Ok(Completion {
            text,
            model: generated.model_version,
            usage,
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

    #[test]
    fn test_system_message_becomes_instruction() {
        let request = build_request(
            &[
                ChatMessage::system("Classify"),
                ChatMessage::user_parts(vec![
                    ContentPart::text("report.mp3"),
                    ContentPart::mp3(vec![1, 2, 3]),
                ]),
            ],
            &GEMINI_SAMPLING,
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Classify");
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["mime_type"], "audio/mp3");
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[tokio::test]
    async fn test_complete_joins_candidate_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash-exp:generateContent")
                .query_param("key", "g-key");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "PEO"}, {"text": "PLE"}]}
                }],
                "usageMetadata": {"promptTokenCount": 100, "candidatesTokenCount": 1, "totalTokenCount": 101},
                "modelVersion": "gemini-2.0-flash-exp"
            }));
        });

        let chat = GeminiChat::new(GeminiConfig {
            api_base: server.base_url(),
            api_key: "g-key".to_string(),
            model: GEMINI_FLASH.to_string(),
            sampling: GEMINI_SAMPLING,
            timeout_secs: 10,
        })
        .unwrap();

        let completion = chat.complete(&[ChatMessage::user("x")]).await.unwrap();
        assert_eq!(completion.text, "PEOPLE");
        assert_eq!(completion.usage.unwrap().total_tokens, 101);
        mock.assert();
    }

    #[tokio::test]
    async fn test_no_candidates_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash-exp:generateContent");
            then.status(200).json_body(json!({"candidates": []}));
        });

        let chat = GeminiChat::new(GeminiConfig {
            api_base: server.base_url(),
            api_key: "g-key".to_string(),
            model: GEMINI_FLASH.to_string(),
            sampling: GEMINI_SAMPLING,
            timeout_secs: 10,
        })
        .unwrap();

        let result = chat.complete(&[ChatMessage::user("x")]).await;
        assert!(matches!(result, Err(Error::EmptyCompletion)));
    }
}
