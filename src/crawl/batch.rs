//! Bounded-concurrency batch scraping
//!
//! Fans out independent single-page scrapes under a counting semaphore.
//! Each task is fully isolated: one URL failing (or panicking) surfaces as
//! an error entry under that URL's key and never aborts its siblings.

use crate::engine::Engine;
use crate::options::{OutputFormat, PageOptions};
use crate::page::PageResult;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrency ceiling used when the caller does not pick one
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

pub(crate) async fn scrape_batch(
    engine: &Engine,
    urls: &[String],
    formats: &[OutputFormat],
    options: &PageOptions,
    concurrency: usize,
) -> BTreeMap<String, PageResult> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let engine = engine.clone();
        let semaphore = Arc::clone(&semaphore);
        let url = url.clone();
        let formats = formats.to_vec();
        let options = options.clone();

        handles.push(tokio::spawn(async move {
            // The semaphore is never closed; an acquire error would only
            // mean the whole batch is being torn down.
            let _permit = semaphore.acquire_owned().await.ok();
            engine.scrape(&url, &formats, &options).await
        }));
    }

    // Results are keyed by the caller's original URL strings, not their
    // normalized forms.
    let mut results = BTreeMap::new();
    for (url, handle) in urls.iter().zip(handles) {
        let page = match handle.await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(%url, error = %e, "batch scrape task failed");
                PageResult::from_error(url, format!("scrape task failed: {e}"))
            }
        };
        results.insert(url.clone(), page);
    }

    results
}
