//! s0301 - keyword metadata for factory reports, cross-referenced with the
//! fact sheets.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::files::{collect_nonempty, file_name, merge_text_files, read_text, FileKind};
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const TASK: &str = "dokumenty";
pub const FACTS_DIR: &str = "facts";

const INSTRUCTIONS: &str = "You are powerful assistant which needs to help me analyze files. The directory of the files is called \"pliki_z_fabryki\". \
You need to analyze the content of the file and generate based on the file content the keywords (in denominator), which then will help to group the files. \
During keywords generation take into account the name of the directory in which files are located as well as the file name. \
While generating keywords for reports you need to take into account also the content of the Fact files which you can find below (the fact file has name like `f01.txt`, `f02.txt`... `f09.txt` etc.). \
You need to bind the content of the report (if possible) with some fact file for example by person name / surname or location and then based on this generate keywords. \
Answer needs to be in Polish. The answer should contain only comma separated denominators starting from small letter. For each report generate at least 15 keywords. \
When any person is mentioned in the report the keywords for the given report also should include the profession as keyword. \
Do not forget about keywords related to Barbara Zawadzka. \
The keywords should not contain additional signs like `-`, `_` etc. (only white space is allowed). \
The content of the Fact files can be found below: \n";

#[derive(Debug, Clone)]
pub struct Options {
    pub reports_dir: PathBuf,
    pub pause: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("pliki_z_fabryki"),
            pause: Duration::from_secs(5),
        }
    }
}

pub fn system_prompt(facts: &str) -> String {
    format!("{}{}", INSTRUCTIONS, facts)
}

pub fn report_message(path: &Path) -> Result<String> {
    Ok(format!(
        "File name: `{}`. File Content: \n {}",
        file_name(path),
        read_text(path)?
    ))
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &Options,
) -> Result<BTreeMap<String, String>> {
    let facts = merge_text_files(&options.reports_dir.join(FACTS_DIR), "Fact file")?;
    let system = system_prompt(&facts);
    let reports = collect_nonempty(&options.reports_dir, |p| FileKind::of(p) == FileKind::Text)?;

    let mut tags = BTreeMap::new();
    for path in reports {
        let prompt = Prompt::new(system.as_str()).user(report_message(&path)?);
        let keywords = prompt.send(model).await?.text.trim().to_string();
        info!("{} -> {}", file_name(&path), keywords);
        tags.insert(file_name(&path), keywords);

        super::pace(options.pause).await;
    }

    centrala.report(TASK, &tags).await?;
    Ok(tags)
}

pub async fn run(env: &Env, options: &Options) -> Result<BTreeMap<String, String>> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
    solve(&model, &super::centrala(env)?, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::http::HttpClient;
    use crate::llm::scripted::ScriptedModel;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_keywords_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let facts = dir.path().join(FACTS_DIR);
        std::fs::create_dir(&facts).unwrap();
        std::fs::write(facts.join("f01.txt"), "Barbara Zawadzka, programistka").unwrap();
        std::fs::write(dir.path().join("report-01.txt"), "Zatrzymano Barbarę").unwrap();
        std::fs::write(dir.path().join("report-02.txt"), "Brak anomalii").unwrap();
        std::fs::write(dir.path().join("photo.png"), [0u8]).unwrap();

        let server = MockServer::start();
        let report = server.mock(|when, then| {
            when.method(POST).path("/report").json_body(json!({
                "task": "dokumenty",
                "apikey": "key",
                "answer": {
                    "report-01.txt": "barbara zawadzka, programistka",
                    "report-02.txt": "cisza, patrol"
                }
            }));
            then.status(200).json_body(json!({"code": 0}));
        });
        let centrala = Centrala::new(
            HttpClient::new().unwrap(),
            Credentials {
                host: server.base_url(),
                api_key: "key".to_string(),
            },
        );

        let model = ScriptedModel::new(&["barbara zawadzka, programistka", "cisza, patrol\n"]);
        let options = Options {
            reports_dir: dir.path().to_path_buf(),
            pause: Duration::ZERO,
        };
        let tags = solve(&model, &centrala, &options).await.unwrap();
        report.assert();
        assert_eq!(tags.len(), 2);

        let seen = model.seen.lock().unwrap();
        assert!(seen[0][0]
            .text()
            .ends_with("\nFact file name: `f01.txt` | Fact file content: `Barbara Zawadzka, programistka`"));
        assert_eq!(
            seen[0][1].text(),
            "File name: `report-01.txt`. File Content: \n Zatrzymano Barbarę"
        );
    }
}
