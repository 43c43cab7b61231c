//! Local input directories
//!
//! Several exercises read a directory of notes, pictures and recordings.
//! Listing is sorted by file name so prompts are reproducible, and an empty
//! selection is an error rather than an empty prompt.

use crate::error::{Error, Result};
use crate::llm::ContentPart;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Png,
    Mp3,
    Other,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("txt") => FileKind::Text,
            Some("png") => FileKind::Png,
            Some("mp3") => FileKind::Mp3,
            _ => FileKind::Other,
        }
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Regular files directly inside `dir` accepted by `filter`, sorted by name.
pub fn list_files<F>(dir: &Path, filter: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && filter(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!("{} files selected in {}", files.len(), dir.display());
    Ok(files)
}

/// Like [`list_files`] but an empty result is an error.
pub fn collect_nonempty<F>(dir: &Path, filter: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let files = list_files(dir, filter)?;
    if files.is_empty() {
        return Err(Error::EmptyInput(format!(
            "no matching files in {}",
            dir.display()
        )));
    }
    Ok(files)
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(read_text(path)?.lines().map(str::to_string).collect())
}

/// Concatenate every `.txt` file of `dir` as
/// ``\n{label} name: `a.txt` | {label} content: `...` ``.
pub fn merge_text_files(dir: &Path, label: &str) -> Result<String> {
    let files = collect_nonempty(dir, |p| FileKind::of(p) == FileKind::Text)?;
    let mut merged = String::new();
    for path in files {
        let content = read_text(&path)?;
        merged.push_str(&format!(
            "\n{label} name: `{}` | {label} content: `{}`",
            file_name(&path),
            content
        ));
    }
    Ok(merged)
}

/// A file turned into prompt parts: its name, then its content.
pub fn file_parts(path: &Path) -> Result<Vec<ContentPart>> {
    let name = file_name(path);
    let parts = match FileKind::of(path) {
        FileKind::Text => vec![ContentPart::text(name), ContentPart::text(read_text(path)?)],
        FileKind::Png => vec![
            ContentPart::text(name),
            ContentPart::png(std::fs::read(path).map_err(|e| Error::io(path, e))?),
        ],
        FileKind::Mp3 => vec![
            ContentPart::text(name),
            ContentPart::mp3(std::fs::read(path).map_err(|e| Error::io(path, e))?),
        ],
        FileKind::Other => {
            return Err(Error::Unsupported(format!("unknown file type {}", name)));
        }
    };
    Ok(parts)
}

/// Every png/mp3 file of `dir` as named parts; other files are skipped
/// with a warning. A missing directory yields nothing.
pub fn media_parts(dir: &Path) -> Result<Vec<ContentPart>> {
    if !dir.exists() {
        warn!("Media directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    for path in list_files(dir, |_| true)? {
        match FileKind::of(&path) {
            FileKind::Png | FileKind::Mp3 => parts.extend(file_parts(&path)?),
            _ => warn!("Skipping unknown file type {}", path.display()),
        }
    }
    Ok(parts)
}
