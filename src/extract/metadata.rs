//! Best-effort metadata extraction
//!
//! Every field is independent: failure to extract one never prevents
//! extraction of the others, and none of them abort the page.

use crate::page::PageMetadata;
use scraper::{Html, Selector};
use url::Url;

/// Extracts page metadata from a parsed document
///
/// The document may already be re-rooted at the selected main-content
/// subtree; fields whose elements were cut away simply stay empty.
pub fn extract_metadata(
    doc: &Html,
    source_url: &str,
    final_url: &str,
    status: u16,
) -> PageMetadata {
    let mut metadata = PageMetadata::new(source_url);
    metadata.final_url = final_url.to_string();
    metadata.http_status = Some(status);

    let base_url = resolve_base_url(doc, final_url);

    if let Ok(selector) = Selector::parse("title") {
        if let Some(element) = doc.select(&selector).next() {
            metadata.title = element.text().collect::<String>().trim().to_string();
        }
    }

    if let Ok(selector) = Selector::parse("html") {
        if let Some(lang) = doc
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("lang"))
        {
            metadata.language = lang.to_lowercase().chars().take(5).collect();
        }
    }

    if let Ok(selector) = Selector::parse("meta[name]") {
        for element in doc.select(&selector) {
            let Some(name) = element.value().attr("name") else {
                continue;
            };
            let content = element.value().attr("content").unwrap_or("").trim();

            if name.eq_ignore_ascii_case("description") && metadata.description.is_empty() {
                metadata.description = content.to_string();
            } else if let Some(key) = strip_prefix_ignore_case(name, "twitter:") {
                metadata
                    .twitter_data
                    .insert(key.to_lowercase(), content.to_string());
            }
        }
    }

    if let Ok(selector) = Selector::parse("link[rel='canonical']") {
        if let Some(href) = doc
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("href"))
        {
            metadata.canonical_url = match &base_url {
                Some(base) => base
                    .join(href)
                    .map(|resolved| resolved.to_string())
                    .unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            };
        }
    }

    if let Ok(selector) = Selector::parse("meta[property]") {
        for element in doc.select(&selector) {
            let Some(property) = element.value().attr("property") else {
                continue;
            };
            let Some(key) = strip_prefix_ignore_case(property, "og:") else {
                continue;
            };
            let key = key.to_lowercase();
            let content = element.value().attr("content").unwrap_or("").trim();
            if key == "type" {
                metadata.page_type = content.to_string();
            }
            metadata.og_data.insert(key, content.to_string());
        }
    }

    metadata.schema_org = extract_schema_org(doc);

    metadata
}

/// Resolves the document's base URL: `<base href>` joined against the final
/// fetched URL when present, otherwise the final URL itself
fn resolve_base_url(doc: &Html, final_url: &str) -> Option<Url> {
    let final_parsed = Url::parse(final_url).ok();

    if let Ok(selector) = Selector::parse("base[href]") {
        if let Some(href) = doc
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("href"))
        {
            if let Some(base) = &final_parsed {
                if let Ok(joined) = base.join(href) {
                    return Some(joined);
                }
            }
            if let Ok(absolute) = Url::parse(href) {
                return Some(absolute);
            }
        }
    }

    final_parsed
}

/// First JSON-LD block that parses as an object, or the first element of a
/// non-empty array; malformed blocks are skipped, not fatal
fn extract_schema_org(doc: &Html) -> serde_json::Value {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return serde_json::Value::Null;
    };

    for element in doc.select(&selector) {
        let raw = element.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(object)) => {
                return serde_json::Value::Object(object);
            }
            Ok(serde_json::Value::Array(mut array)) if !array.is_empty() => {
                return array.remove(0);
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("skipping malformed JSON-LD block: {e}");
                continue;
            }
        }
    }

    serde_json::Value::Null
}

/// Case-insensitive ASCII prefix strip
fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
