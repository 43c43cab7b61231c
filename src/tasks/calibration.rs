//! s0103 - repair a calibration file.
//!
//! The file holds arithmetic samples (`"a + b"` with a possibly wrong
//! result) and a few open questions. Sums are recomputed locally; only the
//! open questions go to the model, batched in one call.

use crate::centrala::{save_envelope, Centrala};
use crate::config::Env;
use crate::error::{Error, Result};
use crate::files::read_text;
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

pub const TASK: &str = "JSON";

pub const SYSTEM_PROMPT: &str = "You will receive the list of questions. \
You need to answer as short as possible, the best answer is 1 word if possible. \
The response need to be written in json format. \
The example of json format is presented below:  \
[{\"q\":\"What is the capital city of Germany?\",\"a\":\"Berlin\"}]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub apikey: String,
    pub description: String,
    pub copyright: String,
    #[serde(rename = "test-data")]
    pub test_data: Vec<TestData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestData {
    pub question: String,
    pub answer: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<OpenQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenQuestion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub a: String,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: PathBuf::from("json.txt"),
            output: PathBuf::from("final.json"),
        }
    }
}

/// Parse `"a + b"` and add the operands.
pub fn compute_sum(question: &str) -> Result<i64> {
    let malformed = || Error::Malformed(format!("not a sum: '{}'", question));
    let (a, b) = question.split_once(" + ").ok_or_else(malformed)?;
    let a: i64 = a.trim().parse().map_err(|_| malformed())?;
    let b: i64 = b.trim().parse().map_err(|_| malformed())?;
    a.checked_add(b)
        .ok_or_else(|| Error::Malformed(format!("sum overflows: '{}'", question)))
}

impl CalibrationData {
    pub fn open_questions(&self) -> Vec<&str> {
        self.test_data
            .iter()
            .filter_map(|d| d.test.as_ref())
            .filter(|t| !t.q.is_empty())
            .map(|t| t.q.as_str())
            .collect()
    }

    /// Fill answers of open questions, drop tests with neither question nor
    /// answer, recompute every sum.
    pub fn apply(&mut self, answers: &[OpenQuestion]) -> Result<()> {
        for data in &mut self.test_data {
            if let Some(test) = &mut data.test {
                if test.q.is_empty() && test.a.is_empty() {
                    data.test = None;
                } else if let Some(found) = answers.iter().find(|r| r.q == test.q) {
                    test.a = found.a.clone();
                }
            }
            data.answer = compute_sum(&data.question)?;
        }
        Ok(())
    }
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &Options,
) -> Result<CalibrationData> {
    let raw = read_text(&options.input)?;
    let mut data: CalibrationData = serde_json::from_str(&raw)?;

    let questions = data.open_questions();
    if questions.is_empty() {
        return Err(Error::EmptyInput(format!(
            "no open questions in {}",
            options.input.display()
        )));
    }
    info!("{} open questions for the model", questions.len());

    let prompt = Prompt::new(SYSTEM_PROMPT).user(questions.join("\n"));
    let reply = prompt.send(model).await?;
    let answers: Vec<OpenQuestion> = serde_json::from_str(super::strip_code_fence(&reply.text))?;

    data.apply(&answers)?;

    let envelope = centrala.envelope(TASK, data);
    save_envelope(&options.output, &envelope)?;
    centrala.send_envelope(&envelope).await?;
    Ok(envelope.answer)
}

pub async fn run(env: &Env, options: &Options) -> Result<CalibrationData> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
    solve(&model, &super::centrala(env)?, options).await
}
