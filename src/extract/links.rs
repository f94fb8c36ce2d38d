//! Anchor extraction
//!
//! Collects every anchor with an `href`, resolved to an absolute URL
//! against the final fetched URL. Scheme filtering is not done here; the
//! admission filter decides what is worth following.

use crate::page::PageLink;
use scraper::{Html, Selector};
use url::Url;

/// Extracts all links from a parsed document
pub fn extract_links(doc: &Html, final_url: &str) -> Vec<PageLink> {
    let Ok(base) = Url::parse(final_url) else {
        tracing::debug!(%final_url, "cannot resolve links against unparseable final URL");
        return Vec::new();
    };

    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in doc.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(absolute) = base.join(href.trim()) else {
                continue;
            };

            let nofollow = element
                .value()
                .attr("rel")
                .map(|rel| {
                    rel.split_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("nofollow"))
                })
                .unwrap_or(false);

            links.push(PageLink {
                text: element.text().collect::<String>().trim().to_string(),
                url: absolute.to_string(),
                nofollow,
            });
        }
    }

    links
}
