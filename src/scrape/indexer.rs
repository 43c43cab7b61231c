//! Article indexer
//!
//! Parses an HTML article into paragraphs plus the images and recordings it
//! references, downloads the media next to the index and renders a
//! line-oriented markdown file. A failed download is logged and skipped;
//! the entry stays in the index with its source URL.

use super::selector;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use reqwest::Url;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONTEXT_LIMIT: usize = 100;
const NO_PARENT: &str = "Brak elementu nadrzędnego";

pub const IMAGES_DIR: &str = "downloaded_images";
pub const AUDIO_DIR: &str = "downloaded_audio";
pub const INDEX_FILE: &str = "indexed.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn dir(&self) -> &'static str {
        match self {
            MediaKind::Image => IMAGES_DIR,
            MediaKind::Audio => AUDIO_DIR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Obraz",
            MediaKind::Audio => "Dźwięk",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub kind: MediaKind,
    /// Absolute source URL.
    pub src: String,
    pub name: String,
    pub alt: Option<String>,
    pub context: String,
    /// Set once the file has been saved locally.
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedDocument {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// Images and recordings in document order.
    pub media: Vec<MediaRef>,
}

impl IndexedDocument {
    pub fn images(&self) -> impl Iterator<Item = &MediaRef> {
        self.media.iter().filter(|m| m.kind == MediaKind::Image)
    }

    pub fn audio(&self) -> impl Iterator<Item = &MediaRef> {
        self.media.iter().filter(|m| m.kind == MediaKind::Audio)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Indeksowany artykuł: {}\n", self.title);

        let _ = writeln!(out, "## Treść tekstowa\n");
        for paragraph in &self.paragraphs {
            let _ = writeln!(out, "- {}", paragraph);
        }

        let _ = writeln!(out, "\n## Obrazy i dźwięki\n");
        let (mut images, mut audio) = (0, 0);
        for media in &self.media {
            let number = match media.kind {
                MediaKind::Image => {
                    images += 1;
                    images
                }
                MediaKind::Audio => {
                    audio += 1;
                    audio
                }
            };
            let _ = write!(out, "- {} {}: src='{}'", media.kind.label(), number, media.src);
            if let Some(alt) = &media.alt {
                let _ = write!(out, ", alt='{}'", alt);
            }
            let _ = write!(out, ", name='{}'", media.name);
            if let Some(path) = &media.local_path {
                let _ = write!(out, ", file='{}'", path.display());
            }
            let _ = writeln!(out, " Kontekst: {}", media.context);
        }
        out
    }
}

/// `<tag> - "text"` of the parent element, text capped at 100 characters.
fn parent_context(element: &ElementRef<'_>) -> String {
    let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
        return NO_PARENT.to_string();
    };

    let tag = parent.value().name();
    let text = parent.text().collect::<String>();
    let text = text.trim();
    let text = if text.chars().count() > CONTEXT_LIMIT {
        format!("{}...", text.chars().take(CONTEXT_LIMIT).collect::<String>())
    } else {
        text.to_string()
    };
    format!("<{}> - \"{}\"", tag, text)
}

fn media_src(element: &ElementRef<'_>) -> Option<String> {
    if let Some(src) = element.value().attr("src").filter(|s| !s.is_empty()) {
        return Some(src.to_string());
    }
    // <audio><source src="..."></audio>
    let sources = selector("source[src]").ok()?;
    element
        .select(&sources)
        .filter_map(|s| s.value().attr("src"))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an article; `article_url` is the base for relative sources.
pub fn parse_article(html: &str, article_url: &str) -> Result<IndexedDocument> {
    let base = Url::parse(article_url)
        .map_err(|e| Error::Html(format!("bad article url '{}': {}", article_url, e)))?;
    let doc = Html::parse_document(html);

    let title = doc
        .select(&selector("title")?)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| base.path().to_string());

    let paragraphs = doc
        .select(&selector("p")?)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut media = Vec::new();
    for element in doc.select(&selector("img, audio")?) {
        let kind = if element.value().name() == "img" {
            MediaKind::Image
        } else {
            MediaKind::Audio
        };
        let Some(raw_src) = media_src(&element) else {
            warn!("<{}> without a source, skipping", element.value().name());
            continue;
        };
        let src = base
            .join(&raw_src)
            .map_err(|e| Error::Html(format!("cannot resolve '{}': {}", raw_src, e)))?;
        let name = src
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|n| !n.is_empty())
            .unwrap_or("media")
            .to_string();

        media.push(MediaRef {
            kind,
            src: src.to_string(),
            name,
            alt: element.value().attr("alt").map(str::to_string),
            context: parent_context(&element),
            local_path: None,
        });
    }

    info!(
        "Parsed article: {} paragraphs, {} media",
        doc.select(&selector("p")?).count(),
        media.len()
    );
    Ok(IndexedDocument {
        title,
        paragraphs,
        media,
    })
}

/// `dir/name`, or `dir/stem_N.ext` when an earlier entry of this run already
/// claimed that path.
fn local_destination(dir: &Path, name: &str, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let mut dest = dir.join(name);
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    while taken.contains(&dest) {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        dest = dir.join(candidate);
        n += 1;
    }
    taken.insert(dest.clone());
    dest
}

/// Downloads media into `work_dir/{downloaded_images,downloaded_audio}`
/// and writes `work_dir/indexed.md`.
pub struct Indexer {
    http: HttpClient,
    work_dir: PathBuf,
}

impl Indexer {
    pub fn new(http: HttpClient, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.work_dir.join(INDEX_FILE)
    }

    /// Fetch, parse, download and persist. Returns the document with local
    /// paths filled in for every media file that could be saved.
    pub async fn index(&self, article_url: &str) -> Result<IndexedDocument> {
        let html = self.http.get_text(article_url).await?;
        let mut doc = parse_article(&html, article_url)?;
        self.download_media(&mut doc).await?;
        self.write(&doc)?;
        Ok(doc)
    }

    pub async fn download_media(&self, doc: &mut IndexedDocument) -> Result<()> {
        let mut taken = HashSet::new();
        for media in &mut doc.media {
            let dir = self.work_dir.join(media.kind.dir());
            std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            let dest = local_destination(&dir, &media.name, &mut taken);

            match self.http.get_bytes(&media.src).await {
                Ok(bytes) => {
                    std::fs::write(&dest, bytes).map_err(|e| Error::io(&dest, e))?;
                    info!("File saved: {}", dest.display());
                    media.local_path = Some(dest);
                }
                Err(e) => warn!("Could not fetch {}: {}", media.src, e),
            }
        }
        Ok(())
    }

    pub fn write(&self, doc: &IndexedDocument) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.work_dir).map_err(|e| Error::io(&self.work_dir, e))?;
        let path = self.index_path();
        std::fs::write(&path, doc.render()).map_err(|e| Error::io(&path, e))?;
        info!("{} written", path.display());
        Ok(path)
    }
}
