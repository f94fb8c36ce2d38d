//! Breadth-first crawl and map drivers
//!
//! One wave per depth level: snapshot the frontier, fetch and extract each
//! admissible member, fold discovered links back into the next frontier.
//! Per-page failures are recorded on the page result and the crawl
//! continues; only option and start-URL errors surface to the caller.

use crate::crawl::session::CrawlSession;
use crate::crawl::{CrawlMetadata, CrawlResult};
use crate::engine::Engine;
use crate::options::{
    validate_crawl_options, validate_map_options, CrawlOptions, MapOptions,
};
use crate::page::PageResult;
use crate::url::{normalize_url, should_crawl, NormalizedUrl};
use crate::PagesiftError;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio_util::sync::CancellationToken;

pub(crate) async fn run_crawl(
    engine: &Engine,
    start_url: &str,
    options: &CrawlOptions,
    cancel: CancellationToken,
) -> Result<CrawlResult, PagesiftError> {
    validate_crawl_options(options)?;
    let start = normalize_url(start_url)?;

    let started_at = Utc::now();
    let mut session = CrawlSession::new(start_url, options.clone());
    session.seed(start);

    // Traversal needs the link graph regardless of what the caller asked
    // for on each page.
    let mut page_options = options.page_options.clone();
    page_options.include_links = true;

    let mut pages: BTreeMap<NormalizedUrl, PageResult> = BTreeMap::new();
    let mut depth: u32 = 0;

    'waves: loop {
        let wave = session.take_wave();
        tracing::debug!(depth, wave_size = wave.len(), "processing crawl wave");

        for url in wave {
            // Cancellation is honored before each fetch and at wave
            // boundaries.
            if cancel.is_cancelled() {
                tracing::info!(%start_url, "crawl cancelled");
                break 'waves;
            }
            if !session.should_crawl(url.as_str()) {
                continue;
            }
            session.mark_visited(url.clone());

            let page = engine
                .scrape(url.as_str(), &options.formats, &page_options)
                .await;
            if let Some(error) = &page.error {
                tracing::warn!(url = %url, %error, "page failed, crawl continues");
            }

            for link in &page.links {
                if session.should_crawl(&link.url) {
                    if let Ok(normalized) = normalize_url(&link.url) {
                        session.enqueue(normalized);
                    }
                }
            }

            pages.insert(url, page);
        }

        depth += 1;
        if session.frontier_is_empty() || cancel.is_cancelled() {
            break;
        }
        if matches!(options.max_depth, Some(max_depth) if depth > max_depth) {
            break;
        }
    }

    let finished_at = Utc::now();
    tracing::info!(
        %start_url,
        total_pages = pages.len(),
        depth_reached = depth.saturating_sub(1),
        "crawl complete"
    );

    Ok(CrawlResult {
        metadata: CrawlMetadata {
            start_url: start_url.to_string(),
            total_pages: pages.len(),
            started_at,
            finished_at,
            depth_reached: depth.saturating_sub(1),
            options: options.clone(),
        },
        pages,
    })
}

/// Maps the URLs reachable from one page
///
/// Exactly one fetch and extract of the start URL; discovered links pass
/// through the same admission rules as a crawl, relative to the start URL.
/// Returns the sorted normalized URL list (including the start URL),
/// optionally filtered by a case-insensitive substring and truncated to
/// `max_pages`.
pub(crate) async fn run_map(
    engine: &Engine,
    url: &str,
    options: &MapOptions,
) -> Result<Vec<NormalizedUrl>, PagesiftError> {
    validate_map_options(options)?;
    let start = normalize_url(url)?;

    let mut visited = HashSet::new();
    visited.insert(start.clone());

    let mut page_options = options.page_options.clone();
    page_options.include_links = true;

    let page = engine.scrape(url, &[], &page_options).await;
    if let Some(message) = page.error {
        return Err(PagesiftError::Page {
            url: url.to_string(),
            message,
        });
    }

    let rules = options.admission_rules();
    let mut found: BTreeSet<NormalizedUrl> = BTreeSet::new();
    found.insert(start);

    for link in &page.links {
        if should_crawl(&link.url, url, &rules, &visited) {
            if let Ok(normalized) = normalize_url(&link.url) {
                found.insert(normalized);
            }
        }
    }

    let search = options.search.as_ref().map(|term| term.to_lowercase());
    let mut urls: Vec<NormalizedUrl> = found
        .into_iter()
        .filter(|candidate| {
            search
                .as_ref()
                .map_or(true, |term| candidate.as_str().to_lowercase().contains(term))
        })
        .collect();

    if let Some(max_pages) = options.max_pages {
        urls.truncate(max_pages);
    }

    tracing::debug!(%url, count = urls.len(), "map complete");
    Ok(urls)
}
