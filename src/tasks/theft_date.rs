//! s0302 - date of the report that mentions the prototype theft.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::files::merge_text_files;
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use std::path::PathBuf;
use tracing::info;

pub const TASK: &str = "wektory";

pub const SYSTEM_PROMPT: &str = "You are powerful assistant which needs to help me analyze files. \
You will receive the files (file name and file contents) which you will need to analyse. \
The file name contains the date in which the report was prepared. \
In report from which day there is information about the theft of a weapon prototype, please provide the answer which is only the date when it happens. \
The date should be in format YYYY-MM-DD";

#[derive(Debug, Clone)]
pub struct Options {
    pub reports_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("pliki_z_fabryki/do-not-share"),
        }
    }
}

pub async fn solve(model: &dyn ChatModel, centrala: &Centrala, options: &Options) -> Result<String> {
    let merged = merge_text_files(&options.reports_dir, "File")?;
    let prompt = Prompt::new(SYSTEM_PROMPT).user(format!("Files content: \n {}", merged));

    let date = prompt.send(model).await?.text.trim().to_string();
    info!("Theft reported on {}", date);

    centrala.report(TASK, &date).await?;
    Ok(date)
}

pub async fn run(env: &Env, options: &Options) -> Result<String> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
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

    fn centrala(base: String) -> Centrala {
        Centrala::new(
            HttpClient::new().unwrap(),
            Credentials {
                host: base,
                api_key: "key".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_empty_dir_stops_before_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new(&[]);
        let options = Options {
            reports_dir: dir.path().to_path_buf(),
        };
        let err = solve(&model, &centrala("http://127.0.0.1:9".to_string()), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_date_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2024_02_21.txt"), "Kradzież prototypu").unwrap();

        let server = MockServer::start();
        let report = server.mock(|when, then| {
            when.method(POST)
                .path("/report")
                .json_body(json!({"task": "wektory", "apikey": "key", "answer": "2024-02-21"}));
            then.status(200).json_body(json!({"code": 0}));
        });

        let model = ScriptedModel::new(&["2024-02-21\n"]);
        let options = Options {
            reports_dir: dir.path().to_path_buf(),
        };
        let date = solve(&model, &centrala(server.base_url()), &options).await.unwrap();
        assert_eq!(date, "2024-02-21");
        report.assert();
    }
}
