//! Content extraction pipeline
//!
//! Turns raw markup into structured output: noise removal, optional
//! main-content selection, best-effort metadata, format generation
//! (markdown / text / html), and link extraction. A failure anywhere in the
//! pipeline surfaces as an error on the page result, never past the page
//! boundary.

mod links;
mod markdown;
mod metadata;
mod text;

pub use markdown::{clean_markdown, render_markdown};
pub use metadata::extract_metadata;
pub use text::render_text;

use crate::options::{OutputFormat, PageOptions};
use crate::page::{PageLink, PageMetadata};
use ego_tree::NodeId;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from the extraction pipeline
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Everything extracted from one page
#[derive(Debug)]
pub struct Extraction {
    pub metadata: PageMetadata,
    pub content: BTreeMap<OutputFormat, String>,
    pub links: Vec<PageLink>,
}

/// Runs the full extraction pipeline over raw markup
///
/// Pipeline order: parse, remove excluded selectors, optionally re-root at
/// the main-content subtree (selector, then `body`, then the whole
/// document), extract metadata, generate the requested formats, extract
/// links. Unrequested formats are simply omitted from the content map.
pub fn extract_page(
    raw: &str,
    formats: &[OutputFormat],
    options: &PageOptions,
    source_url: &str,
    final_url: &str,
    status: u16,
) -> Result<Extraction, ExtractError> {
    let mut doc = Html::parse_document(raw);

    remove_excluded(&mut doc, &options.exclude_tags);

    let doc = if options.extract_main_content {
        select_main_content(&doc, &options.main_content_selector)?
    } else {
        doc
    };

    let metadata = extract_metadata(&doc, source_url, final_url, status);
    let content = generate_formats(&doc, formats, options);
    let links = if options.include_links {
        links::extract_links(&doc, final_url)
    } else {
        Vec::new()
    };

    Ok(Extraction {
        metadata,
        content,
        links,
    })
}

/// Detaches every element matching the exclusion selectors
///
/// Unparseable selectors are skipped; exclusion is cleanup, not policy.
fn remove_excluded(doc: &mut Html, exclude: &[String]) {
    for pattern in exclude {
        let Ok(selector) = Selector::parse(pattern) else {
            tracing::debug!(%pattern, "skipping unparseable exclude selector");
            continue;
        };
        let ids: Vec<NodeId> = doc.select(&selector).map(|element| element.id()).collect();
        for id in ids {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Re-roots the document at the first match of the main-content selector
///
/// Falls back to `body`, then to the whole document, when nothing matches.
fn select_main_content(doc: &Html, selector_str: &str) -> Result<Html, ExtractError> {
    let selector = Selector::parse(selector_str).map_err(|e| ExtractError::Selector {
        selector: selector_str.to_string(),
        message: e.to_string(),
    })?;

    if let Some(main) = doc.select(&selector).next() {
        return Ok(Html::parse_document(&main.html()));
    }

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = doc.select(&body_selector).next() {
            return Ok(Html::parse_document(&body.html()));
        }
    }

    Ok(doc.clone())
}

fn generate_formats(
    doc: &Html,
    formats: &[OutputFormat],
    options: &PageOptions,
) -> BTreeMap<OutputFormat, String> {
    let mut content = BTreeMap::new();

    for format in formats {
        match format {
            OutputFormat::Markdown => {
                let mut rendered = render_markdown(doc);
                if options.clean_markdown {
                    rendered = clean_markdown(&rendered);
                }
                content.insert(OutputFormat::Markdown, rendered);
            }
            OutputFormat::Text => {
                content.insert(OutputFormat::Text, render_text(doc));
            }
            OutputFormat::Html => {
                content.insert(OutputFormat::Html, doc.root_element().html());
            }
        }
    }

    content
}
