//! s0402 - classify lab samples with a fine-tuned model.
//!
//! `prepare` turns the labelled samples into a chat fine-tuning file;
//! `validate` runs the tuned model over the unlabelled ones and reports the
//! ids it accepts.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::{Error, Result};
use crate::files::read_lines;
use crate::llm::{ChatModel, Role, SamplingParams};
use crate::prompt::Prompt;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TASK: &str = "research";
pub const INSTRUCTION: &str = "Classify result";
pub const TUNED_MODEL: &str = "ft:gpt-4o-2024-08-06:personal:aidevs-s0402:AynjYXCK";
pub const SAMPLES_PER_LABEL: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingMessage {
    pub role: String,
    pub content: String,
}

/// One line of the fine-tuning JSONL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub messages: Vec<TrainingMessage>,
}

impl TrainingExample {
    pub fn new(sample: &str, correct: bool) -> Self {
        let message = |role: Role, content: &str| TrainingMessage {
            role: role.as_str().to_string(),
            content: content.to_string(),
        };
        Self {
            messages: vec![
                message(Role::System, INSTRUCTION),
                message(Role::User, sample),
                message(Role::Assistant, if correct { "Y" } else { "N" }),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub correct: PathBuf,
    pub incorrect: PathBuf,
    pub output: PathBuf,
    pub limit: usize,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            correct: PathBuf::from("lab_data/correct.txt"),
            incorrect: PathBuf::from("lab_data/incorrect.txt"),
            output: PathBuf::from("data.jsonl"),
            limit: SAMPLES_PER_LABEL,
        }
    }
}

fn non_blank(lines: &[String]) -> impl Iterator<Item = &String> {
    lines.iter().filter(|l| !l.trim().is_empty())
}

/// Up to `limit` examples per label, shuffled together. Blank lines are
/// not samples.
pub fn training_examples<R: Rng + ?Sized>(
    correct: &[String],
    incorrect: &[String],
    limit: usize,
    rng: &mut R,
) -> Vec<TrainingExample> {
    let mut examples: Vec<TrainingExample> = non_blank(incorrect)
        .take(limit)
        .map(|s| TrainingExample::new(s, false))
        .chain(non_blank(correct).take(limit).map(|s| TrainingExample::new(s, true)))
        .collect();
    examples.shuffle(rng);
    examples
}

pub fn write_jsonl(path: &Path, examples: &[TrainingExample]) -> Result<()> {
    let mut out = Vec::new();
    for example in examples {
        serde_json::to_writer(&mut out, example)?;
        out.push(b'\n');
    }
    let mut file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    file.write_all(&out).map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Build the fine-tuning file; returns the number of examples written.
pub fn prepare(options: &PrepareOptions) -> Result<usize> {
    let correct = read_lines(&options.correct)?;
    let incorrect = read_lines(&options.incorrect)?;
    let examples = training_examples(&correct, &incorrect, options.limit, &mut rand::thread_rng());
    if examples.is_empty() {
        return Err(Error::EmptyInput("no training samples".to_string()));
    }
    write_jsonl(&options.output, &examples)?;
    info!(
        "{} training examples written to {}",
        examples.len(),
        options.output.display()
    );
    Ok(examples.len())
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub input: PathBuf,
    pub model: String,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("lab_data/verify.txt"),
            model: TUNED_MODEL.to_string(),
        }
    }
}

/// `NN=sample` into `(NN, sample)`; blank lines are skipped.
pub fn parse_samples(lines: &[String]) -> Result<Vec<(String, String)>> {
    lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            line.split_once('=')
                .map(|(id, data)| (id.trim().to_string(), data.to_string()))
                .ok_or_else(|| Error::Malformed(format!("expected 'id=data', got '{}'", line)))
        })
        .collect()
}

/// Ids of samples the model answers `Y` for, in input order.
pub async fn validate_samples(model: &dyn ChatModel, samples: &[(String, String)]) -> Result<Vec<String>> {
    let mut accepted = Vec::new();
    for (id, data) in samples {
        let prompt = Prompt::new(INSTRUCTION).user(data.as_str());
        let verdict = prompt.send(model).await?.text;
        debug!("{} -> {}", id, verdict);
        if verdict.trim() == "Y" {
            accepted.push(id.clone());
        }
    }
    info!("Accepted samples: {:?}", accepted);
    Ok(accepted)
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &ValidateOptions,
) -> Result<Vec<String>> {
    let samples = parse_samples(&read_lines(&options.input)?)?;
    if samples.is_empty() {
        return Err(Error::EmptyInput(format!(
            "no samples in {}",
            options.input.display()
        )));
    }
    let accepted = validate_samples(model, &samples).await?;
    centrala.report(TASK, &accepted).await?;
    Ok(accepted)
}

pub async fn validate(env: &Env, options: &ValidateOptions) -> Result<Vec<String>> {
    let model = super::openai(env, &options.model, SamplingParams::default())?;
    solve(&model, &super::centrala(env)?, options).await
}
