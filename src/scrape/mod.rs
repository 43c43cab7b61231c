//! HTML scraping
//!
//! - `extract_question`: the anti-captcha question on the login page
//! - `indexer`: flattening an article with images and recordings into a
//!   markdown index the model can read

pub mod indexer;

pub use indexer::{IndexedDocument, Indexer, MediaKind, MediaRef};

use crate::error::{Error, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

fn br_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"))
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Html(format!("bad selector '{}': {}", css, e)))
}

/// Text after the first `<br>` inside `p#human-question`.
pub fn extract_question(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let paragraph = doc
        .select(&selector("p#human-question")?)
        .next()
        .ok_or_else(|| Error::Html("p#human-question not found".to_string()))?;

    let inner = paragraph.inner_html();
    let question = br_splitter()
        .split(&inner)
        .nth(1)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            Error::Html("unexpected format in human-question paragraph".to_string())
        })?;

    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_question() {
        let html = r#"<html><body>
            <form method="post">
              <p id="human-question">Question:<br />Rok lądowania na Księżycu?</p>
              <input type="text" name="answer">
            </form>
        </body></html>"#;
        assert_eq!(extract_question(html).unwrap(), "Rok lądowania na Księżycu?");
    }

    #[test]
    fn test_extract_question_missing_paragraph() {
        let err = extract_question("<p>nothing</p>").unwrap_err();
        assert!(matches!(err, Error::Html(_)));
    }

    #[test]
    fn test_extract_question_without_break() {
        let html = r#"<p id="human-question">Question: no break here</p>"#;
        assert!(extract_question(html).is_err());
    }
}
