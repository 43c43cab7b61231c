//! s0204 - sort factory reports into people and hardware notes.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::files::{collect_nonempty, file_name, file_parts};
use crate::llm::gemini::GEMINI_FLASH;
use crate::llm::ChatModel;
use crate::prompt::Prompt;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const TASK: &str = "kategorie";

pub const SYSTEM_PROMPT: &str = "You are helpful assistant. Based on the provided instructions, classify the content of the send files (.mp3, .png and .txt) into one of the following categories:\n \
- \"PEOPLE\" if the note contains information about captured people or traces of their presence.\n \
- \"HARDWARE\" if the note contains information only about the repaired hardware faults, software issues should not be included to this category.\n \
- \"UNKNOWN\" if the file can not be assigned to PEOPLE or HARDWARE category.\n\
Your response should contain only the category.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    People,
    Hardware,
    Unknown,
}

impl Category {
    /// `PEOPLE` wins when a reply mentions both.
    pub fn from_reply(reply: &str) -> Self {
        if reply.contains("PEOPLE") {
            Category::People
        } else if reply.contains("HARDWARE") {
            Category::Hardware
        } else {
            Category::Unknown
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub people: Vec<String>,
    pub hardware: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub files_dir: PathBuf,
    pub pause: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            files_dir: PathBuf::from("pliki_z_fabryki"),
            pause: Duration::from_secs(10),
        }
    }
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &Options,
) -> Result<Classification> {
    let files = collect_nonempty(&options.files_dir, |_| true)?;
    let mut result = Classification::default();

    for path in files {
        let name = file_name(&path);
        let prompt = Prompt::new(SYSTEM_PROMPT).user_parts(file_parts(&path)?);
        let reply = prompt.send(model).await?;

        match Category::from_reply(&reply.text) {
            Category::People => {
                info!("File {} classified to PEOPLE", name);
                result.people.push(name);
            }
            Category::Hardware => {
                info!("File {} classified to HARDWARE", name);
                result.hardware.push(name);
            }
            Category::Unknown => info!("File {} not classified: {}", name, reply.text.trim()),
        }
        super::pace(options.pause).await;
    }

    result.people.sort();
    result.hardware.sort();
    centrala.report(TASK, &result).await?;
    Ok(result)
}

pub async fn run(env: &Env, options: &Options) -> Result<Classification> {
    let model = super::gemini(env, GEMINI_FLASH)?;
    solve(&model, &super::centrala(env)?, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::error::Error;
    use crate::http::HttpClient;
    use crate::llm::scripted::ScriptedModel;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_category_from_reply() {
        assert_eq!(Category::from_reply("PEOPLE"), Category::People);
        assert_eq!(Category::from_reply("Category: HARDWARE\n"), Category::Hardware);
        assert_eq!(Category::from_reply("UNKNOWN"), Category::Unknown);
        assert_eq!(Category::from_reply("PEOPLE or HARDWARE"), Category::People);
    }

    fn centrala(server: &MockServer) -> Centrala {
        Centrala::new(
            HttpClient::new().unwrap(),
            Credentials {
                host: server.base_url(),
                api_key: "key".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_classify_and_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2024-11-12_report-00-sektor_C4.txt"), "Schwytano intruza").unwrap();
        std::fs::write(dir.path().join("2024-11-12_report-01-sektor_A1.txt"), "Wymiana anteny").unwrap();
        std::fs::write(dir.path().join("2024-11-12_report-02-sektor_A3.txt"), "Cisza").unwrap();

        let server = MockServer::start();
        let report = server.mock(|when, then| {
            when.method(POST).path("/report").json_body(json!({
                "task": "kategorie",
                "apikey": "key",
                "answer": {
                    "people": ["2024-11-12_report-00-sektor_C4.txt"],
                    "hardware": ["2024-11-12_report-01-sektor_A1.txt"]
                }
            }));
            then.status(200).json_body(json!({"code": 0}));
        });

        let model = ScriptedModel::new(&["PEOPLE", "HARDWARE", "UNKNOWN"]);
        let options = Options {
            files_dir: dir.path().to_path_buf(),
            pause: Duration::ZERO,
        };
        let result = solve(&model, &centrala(&server), &options).await.unwrap();

        report.assert();
        assert_eq!(result.people.len(), 1);
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weapons_tests.zip"), [0u8; 4]).unwrap();

        let server = MockServer::start();
        let model = ScriptedModel::new(&[]);
        let options = Options {
            files_dir: dir.path().to_path_buf(),
            pause: Duration::ZERO,
        };
        let err = solve(&model, &centrala(&server), &options).await.unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert_eq!(model.calls(), 0);
    }
}
