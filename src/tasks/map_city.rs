//! s0202 - name the city from map fragments.

use crate::config::Env;
use crate::error::{Error, Result};
use crate::files::{collect_nonempty, FileKind};
use crate::llm::openai::GPT_4O;
use crate::llm::{ChatModel, ContentPart, SamplingParams};
use crate::prompt::Prompt;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SYSTEM_PROMPT: &str = "You are an expert at Polish geography, topography, architecture and history.\n \
You are looking at different parts of a map of a city in Poland. It's not \"Toruń\" and it's not \"Kalisz\" and it's not \"Bydgoszcz\".\n \
There used to be \"spichlerze i twierdze\" in the city. Some maps contain street numbers - pay special attention to them.\n \
Warning: one of the parts shows a map of a different city.\n \
Based on the geographical features, street layouts, and any visible landmarks, can you identify which city this is? \
Please provide your reasoning.";

#[derive(Debug, Clone)]
pub struct Options {
    pub images_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
        }
    }
}

/// One user turn per map fragment, in file name order.
pub fn build_prompt(images_dir: &Path) -> Result<Prompt> {
    let images = collect_nonempty(images_dir, |p| FileKind::of(p) == FileKind::Png)?;
    let mut prompt = Prompt::new(SYSTEM_PROMPT);
    for path in images {
        let data = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
        prompt = prompt.user_parts(vec![ContentPart::png(data)]);
    }
    Ok(prompt)
}

/// The model's reasoning and verdict; nothing is submitted.
pub async fn solve(model: &dyn ChatModel, options: &Options) -> Result<String> {
    let prompt = build_prompt(&options.images_dir)?;
    info!("Sending {} map fragments", prompt.len() - 1);
    let answer = prompt.send(model).await?.text;
    info!("Final response is: {}", answer);
    Ok(answer)
}

pub async fn run(env: &Env, options: &Options) -> Result<String> {
    let model = super::openai(env, GPT_4O, SamplingParams::deterministic())?;
    solve(&model, options).await
}
