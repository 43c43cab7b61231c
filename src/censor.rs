//! Sanity check of a censored sentence before submission.
//!
//! Rules of the censorship task: every sensitive group (first name + last
//! name, street name + number, city, age) collapses into one `CENZURA`
//! token, and the punctuation of the original sentence stays untouched.

use regex::Regex;
use std::sync::OnceLock;

pub const MARKER: &str = "CENZURA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// No `CENZURA` token at all.
    NoMarker,
    /// Two markers next to each other, e.g. `CENZURA CENZURA`.
    DoubledMarker,
    /// Digits survived (street numbers, ages).
    DigitsLeft(String),
    /// Punctuation sequence differs from the original.
    Punctuation { expected: String, found: String },
    /// Runs of spaces that were not in the original.
    Spacing,
}

fn doubled() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"CENZURA\s+CENZURA").expect("static regex"))
}

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

fn punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '-'))
        .collect()
}

/// All rule violations found in `censored`, empty when it looks right.
pub fn inspect(original: &str, censored: &str) -> Vec<Violation> {
    let original = original.trim();
    let censored = censored.trim();
    let mut violations = Vec::new();

    if !censored.contains(MARKER) {
        violations.push(Violation::NoMarker);
    }
    if doubled().is_match(censored) {
        violations.push(Violation::DoubledMarker);
    }
    if let Some(m) = digits().find(censored) {
        violations.push(Violation::DigitsLeft(m.as_str().to_string()));
    }

    let expected = punctuation(original);
    let found = punctuation(censored);
    if expected != found {
        violations.push(Violation::Punctuation { expected, found });
    }

    if censored.contains("  ") && !original.contains("  ") {
        violations.push(Violation::Spacing);
    }
    violations
}
