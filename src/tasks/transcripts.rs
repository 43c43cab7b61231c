//! s0201 - find a street from witness recordings.
//!
//! Recordings are transcribed first; the local model then reasons over all
//! transcripts at once, and a second call strips the reply down to the
//! street name alone.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::files::{collect_nonempty, file_name};
use crate::llm::ollama::BIELIK;
use crate::llm::openai::OpenAiConfig;
use crate::llm::transcribe::WHISPER;
use crate::llm::{ChatModel, Transcriber};
use crate::prompt::Prompt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TASK: &str = "mp3";
pub const LANGUAGE: &str = "pl";

pub const SYSTEM_PROMPT: &str = "Otrzymasz w kolejnej wiadomości listę transkrypcji zeznań świadków, którzy mogą coś wiedzieć o porwaniu Profesora Andrzeja Maja. \
Na podstawie przesłanych transkrypcji musisz ustalić nazwę na jakiej ulicy znajduje się uczelnia, na której wykłada Andrzej Maj. \
Pamiętaj, że zeznania świadków mogą być sprzeczne, niektórzy z nich mogą się mylić, a inni odpowiadać w dość dziwny sposób. \
Nazwa ulicy nie pada w treści transkrypcji. \
Musisz sam wywnioskować odpowiedź na jakiej ulicy znajduje się uczelnia na której wykłada Profesor Andrzej Maj. \
Jako odpowiedź zwróć tylko nazwę ulicy, bez żadnych dodatkowych informacji.";

pub const EXTRACT_PROMPT: &str = "Z przesłanego tekstu wyodrębniasz wyłącznie nazwę ulicy.";

#[derive(Debug, Clone)]
pub struct Options {
    pub records_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            records_dir: PathBuf::from("records"),
        }
    }
}

/// Transcripts keyed by file name, in name order. An empty directory is an
/// error.
pub async fn transcribe_dir(
    transcriber: &Transcriber,
    dir: &Path,
) -> Result<BTreeMap<String, String>> {
    let records = collect_nonempty(dir, |_| true)?;
    info!("Files to transcribe: {:?}", records);

    let mut transcripts = BTreeMap::new();
    for record in records {
        let text = transcriber.transcribe_file(&record).await?;
        info!("Transcript of {}: {}", record.display(), text);
        transcripts.insert(file_name(&record), text);
    }
    Ok(transcripts)
}

pub fn transcripts_message(transcripts: &BTreeMap<String, String>) -> String {
    let mut content = String::from("Transkrypcje zeznań świadków:\n");
    for (name, text) in transcripts {
        content.push_str(&format!(
            "nazwa pliku: {} | transkrypcja: {} . \n\n",
            name, text
        ));
    }
    content
}

/// Reason over the transcripts, extract the street, submit it.
pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    transcripts: &BTreeMap<String, String>,
) -> Result<String> {
    let prompt = Prompt::new(SYSTEM_PROMPT).user(transcripts_message(transcripts));
    let reasoning = prompt.send(model).await?;
    info!("Model reasoning: {}", reasoning.text);

    let extract = Prompt::new(EXTRACT_PROMPT).user(format!(
        "Z przesłanego stringa musisz WYEKSTRAHOWAĆ TYLKO nazwę ulicy. String: {}",
        reasoning.text
    ));
    let street = extract.send(model).await?.text.trim().to_string();
    info!("Street: {}", street);

    centrala.report(TASK, &street).await?;
    Ok(street)
}

pub async fn run(env: &Env, options: &Options) -> Result<String> {
    let transcriber = Transcriber::new(OpenAiConfig::from_env(env, WHISPER)?, LANGUAGE)?;
    let transcripts = transcribe_dir(&transcriber, &options.records_dir).await?;
    let model = super::ollama(env, BIELIK)?;
    solve(&model, &super::centrala(env)?, &transcripts).await
}
