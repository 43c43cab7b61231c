//! s0205 - answer questions about a multimedia article.
//!
//! The article is indexed once into a working directory; every question is
//! then asked against the same shared context: the index file plus every
//! downloaded image and recording.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::files::{media_parts, read_text};
use crate::llm::gemini::GEMINI_FLASH;
use crate::llm::{ChatModel, ContentPart};
use crate::prompt::Prompt;
use crate::scrape::indexer::{Indexer, AUDIO_DIR, IMAGES_DIR};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const TASK: &str = "arxiv";
pub const ARTICLE_PATH: &str = "dane/arxiv-draft.html";
pub const QUESTIONS_FILE: &str = "arxiv.txt";

pub const SYSTEM_PROMPT: &str = "Jesteś pomocnym asystentem. Otrzymasz różny kontent pochodzący z zaindeksowanej strony HTML. \
Kontent zawiera zaindeksowaną stronę HTML (plik indexed.md) a także obrazy (pliki .png) oraz ścieżki audio (pliki .mp3). \
Plik indexed.md zawiera przechwycone materiały które muszą Ci posłużyć do odpowiedzenia na pytania które otrzymasz. \
W celu udzielenia odpowiedzi na pytania, musisz wziąć pod uwagę plik indexed.md a także pliki .png oraz .mp3. \
Odpowiedź na pytanie powinna być krótka i zwięzła, bez dodatkowych znaków. Jeżeli jest to możliwe to odpowiedź powinna być w formie jednego wyrazu. \
Dodatkowe informacje które powinieneś uwzględnić to to że Rynek to nie miasto. A w pytaniu o Owoc musisz podać nazwę owocu. \
W przypadku nazw własnych podaj nazwy w oryginalnym języku.";

#[derive(Debug, Clone)]
pub struct Options {
    pub work_dir: PathBuf,
    pub pause: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            pause: Duration::from_secs(5),
        }
    }
}

/// `id=question` lines; anything without `=` is ignored, later duplicates
/// win.
pub fn parse_questions(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(id, question)| (id.trim().to_string(), question.trim().to_string()))
        .filter(|(id, _)| !id.is_empty())
        .collect()
}

/// Index file content followed by every downloaded image and recording.
pub fn shared_context(work_dir: &Path, index_file: &Path) -> Result<Vec<ContentPart>> {
    let mut parts = vec![
        ContentPart::text("This is indexed content."),
        ContentPart::text(read_text(index_file)?),
    ];
    parts.extend(media_parts(&work_dir.join(IMAGES_DIR))?);
    parts.extend(media_parts(&work_dir.join(AUDIO_DIR))?);
    Ok(parts)
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &Options,
) -> Result<BTreeMap<String, String>> {
    let indexer = Indexer::new(centrala.http().clone(), &options.work_dir);
    let article_url = format!("{}/{}", centrala.host(), ARTICLE_PATH);
    let doc = indexer.index(&article_url).await?;
    info!(
        "Indexed '{}': {} paragraphs, {} media",
        doc.title,
        doc.paragraphs.len(),
        doc.media.len()
    );

    let questions = parse_questions(&centrala.data_file(QUESTIONS_FILE).await?);
    for (id, question) in &questions {
        info!("{}: {}", id, question);
    }

    let context = shared_context(&options.work_dir, &indexer.index_path())?;

    let mut answers = BTreeMap::new();
    for (id, question) in questions {
        info!("Asking: {}", question);
        let mut parts = context.clone();
        parts.push(ContentPart::text(format!("Pytanie: {}", question)));

        let prompt = Prompt::new(SYSTEM_PROMPT).user_parts(parts);
        let answer = prompt.send(model).await?.text.trim().to_string();
        info!("Answer {}: {}", id, answer);
        answers.insert(id, answer);

        super::pace(options.pause).await;
    }

    centrala.report(TASK, &answers).await?;
    Ok(answers)
}

pub async fn run(env: &Env, options: &Options) -> Result<BTreeMap<String, String>> {
    let model = super::gemini(env, GEMINI_FLASH)?;
    solve(&model, &super::centrala(env)?, options).await
}
