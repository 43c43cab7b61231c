//! Speech-to-text via the hosted transcription endpoint

use super::openai::OpenAiConfig;
use crate::error::{Error, Result};
use crate::http::read_text;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const WHISPER: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct Transcriber {
    client: Client,
    config: OpenAiConfig,
    language: String,
}

impl Transcriber {
    /// `config.model` is the speech model; `language` an ISO-639-1 hint.
    pub fn new(config: OpenAiConfig, language: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(&config.api_base, e))?;
        Ok(Self {
            client,
            config,
            language: language.to_string(),
        })
    }

    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        self.transcribe(&name, data).await
    }

    pub async fn transcribe(&self, file_name: &str, data: Vec<u8>) -> Result<String> {
        let url = format!(
            "{}/audio/transcriptions",
            self.config.api_base.trim_end_matches('/')
        );
        let form = Form::new()
            .text("model", self.config.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "json")
            .part("file", Part::bytes(data).file_name(file_name.to_string()));

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        let body = read_text(&url, resp).await?;
        let parsed: TranscriptionResponse = serde_json::from_str(&body)?;
        info!("Transcript of {}: {}", file_name, parsed.text);
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_transcribe_uploads_file() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .header("authorization", "Bearer sk-test")
                .body_contains("whisper-1")
                .body_contains("adam.m4a");
            then.status(200).body(r#"{"text":"Profesor Maj wykładał na uczelni."}"#);
        });

        let mut config = OpenAiConfig::new("sk-test".to_string(), WHISPER);
        config.api_base = server.base_url();
        let transcriber = Transcriber::new(config, "pl").unwrap();

        let text = transcriber
            .transcribe("adam.m4a", vec![0u8; 16])
            .await
            .unwrap();
        assert_eq!(text, "Profesor Maj wykładał na uczelni.");
        mock.assert();
    }
}
