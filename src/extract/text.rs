//! Plain-text rendering
//!
//! Visible text with newline-separated block boundaries, matching the
//! "strip each text node, join with newlines" shape of the extraction
//! pipeline.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("hardcoded regex pattern is valid"));

/// Extracts visible text from a parsed document
///
/// Text nodes are trimmed and joined with single newlines; runs of three or
/// more newlines collapse to exactly one blank line.
pub fn render_text(doc: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for text in doc.root_element().text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    collapse_blank_runs(&parts.join("\n")).trim().to_string()
}

/// Collapses runs of three or more newlines to a single blank line
pub fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUNS.replace_all(text, "\n\n").into_owned()
}
