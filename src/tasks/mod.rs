//! Exercise pipelines
//!
//! Each module is one exercise: fetch input, build a prompt, call a model,
//! submit the result. `run` wires clients from the environment; `solve`
//! (where present) takes ready clients so it can be driven by tests.
//!
//! | module        | exercise | provider         |
//! |---------------|----------|------------------|
//! | `login`       | s0101    | OpenAI           |
//! | `verify`      | s0102    | OpenAI           |
//! | `calibration` | s0103    | OpenAI           |
//! | `censorship`  | s0105    | Ollama           |
//! | `transcripts` | s0201    | Whisper + Ollama |
//! | `map_city`    | s0202    | OpenAI (vision)  |
//! | `categories`  | s0204    | Gemini           |
//! | `arxiv`       | s0205    | Gemini           |
//! | `keywords`    | s0301    | OpenAI           |
//! | `theft_date`  | s0302    | OpenAI           |
//! | `database`    | s0303    | OpenAI           |
//! | `research`    | s0402    | OpenAI (tuned)   |

pub mod arxiv;
pub mod calibration;
pub mod categories;
pub mod censorship;
pub mod database;
pub mod keywords;
pub mod login;
pub mod map_city;
pub mod research;
pub mod theft_date;
pub mod transcripts;
pub mod verify;

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::http::HttpClient;
use crate::llm::gemini::{GeminiChat, GeminiConfig};
use crate::llm::ollama::{OllamaChat, OllamaConfig};
use crate::llm::openai::{OpenAiChat, OpenAiConfig};
use crate::llm::SamplingParams;
use std::time::Duration;

pub(crate) fn centrala(env: &Env) -> Result<Centrala> {
    Ok(Centrala::new(HttpClient::new()?, env.centrala()?))
}

pub(crate) fn openai(env: &Env, model: &str, sampling: SamplingParams) -> Result<OpenAiChat> {
    OpenAiChat::new(OpenAiConfig::from_env(env, model)?.with_sampling(sampling))
}

pub(crate) fn gemini(env: &Env, model: &str) -> Result<GeminiChat> {
    GeminiChat::new(GeminiConfig::from_env(env, model)?)
}

pub(crate) fn ollama(env: &Env, model: &str) -> Result<OllamaChat> {
    OllamaChat::new(OllamaConfig::from_env(env, model)?)
}

/// Fixed delay between successive model calls, to stay under provider
/// rate limits.
pub(crate) async fn pace(pause: Duration) {
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}

/// Drop a surrounding markdown code fence, if the model added one.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("[1]"), "[1]");
        assert_eq!(strip_code_fence("```json\n[{\"q\":\"a\"}]\n```"), "[{\"q\":\"a\"}]");
        assert_eq!(strip_code_fence("```\nplain\n```"), "plain");
    }
}
