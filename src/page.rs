//! Page-level value objects
//!
//! A [`PageResult`] is the structured output of fetching and extracting one
//! page. These are plain value objects returned to the caller; the engine
//! holds no reference to them after return.

use crate::options::OutputFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A link discovered on a page, resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Visible anchor text
    pub text: String,

    /// Absolute URL, resolved against the final fetched URL
    pub url: String,

    /// True if the anchor's `rel` attribute contains `nofollow`
    pub nofollow: bool,
}

/// Metadata extracted from a page
///
/// Every field is filled best-effort: a failure to extract one field never
/// prevents extraction of the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Text of the `<title>` element
    #[serde(default)]
    pub title: String,

    /// Content of `<meta name="description">` (case-insensitive name match)
    #[serde(default)]
    pub description: String,

    /// `lang` attribute of `<html>`, lower-cased and truncated to 5 characters
    #[serde(default)]
    pub language: String,

    /// `href` of `<link rel="canonical">`, resolved against an in-document
    /// `<base href>` if present, otherwise against the final fetched URL
    #[serde(default)]
    pub canonical_url: String,

    /// URL after following redirects
    #[serde(default)]
    pub final_url: String,

    /// URL the caller asked for
    pub source_url: String,

    /// HTTP status of the fetch; `None` when the fetch itself failed
    pub http_status: Option<u16>,

    /// Open Graph properties, keyed by the suffix after `og:`
    #[serde(default)]
    pub og_data: BTreeMap<String, String>,

    /// Twitter card properties, keyed by the suffix after `twitter:`
    #[serde(default)]
    pub twitter_data: BTreeMap<String, String>,

    /// First JSON-LD block that parses as an object (or the first element of
    /// a non-empty array); `null` when the page carries none
    #[serde(default)]
    pub schema_org: serde_json::Value,

    /// Mirror of the `og:type` property, or `"unknown"`
    pub page_type: String,

    /// When the page was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl PageMetadata {
    /// Creates metadata for a page that has not been fetched yet
    pub fn new(source_url: &str) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            language: String::new(),
            canonical_url: String::new(),
            final_url: String::new(),
            source_url: source_url.to_string(),
            http_status: None,
            og_data: BTreeMap::new(),
            twitter_data: BTreeMap::new(),
            schema_org: serde_json::Value::Null,
            page_type: "unknown".to_string(),
            retrieved_at: Utc::now(),
        }
    }
}

/// The structured output of fetching and extracting a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub metadata: PageMetadata,

    /// Generated content, keyed by requested output format; empty when the
    /// fetch or extraction failed
    #[serde(default)]
    pub content: BTreeMap<OutputFormat, String>,

    /// Links found on the page (only populated when `include_links` is set)
    #[serde(default)]
    pub links: Vec<PageLink>,

    /// Set when the fetch or extraction failed; the page never aborts a
    /// surrounding crawl or batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    /// Creates an empty result for the given source URL
    pub fn new(source_url: &str) -> Self {
        Self {
            metadata: PageMetadata::new(source_url),
            content: BTreeMap::new(),
            links: Vec::new(),
            error: None,
        }
    }

    /// Creates a result that carries only an error
    pub fn from_error(source_url: &str, message: impl Into<String>) -> Self {
        let mut result = Self::new(source_url);
        result.error = Some(message.into());
        result
    }
}
