//! Per-crawl traversal state
//!
//! A session owns the visited set and the frontier for exactly one crawl or
//! map invocation. It is constructed fresh per call and dropped with it,
//! which keeps the engine itself stateless and reentrant.

use crate::options::CrawlOptions;
use crate::url::{should_crawl, NormalizedUrl};
use std::collections::HashSet;

/// Mutable state of one crawl invocation
#[derive(Debug)]
pub struct CrawlSession {
    /// Original start URL; admission is always evaluated against it
    base_url: String,

    options: CrawlOptions,

    /// URLs already fetched this session; grows monotonically
    visited: HashSet<NormalizedUrl>,

    /// URLs scheduled for the next wave; never contains a visited URL
    frontier: HashSet<NormalizedUrl>,
}

impl CrawlSession {
    /// Creates a session rooted at the given start URL
    pub fn new(base_url: impl Into<String>, options: CrawlOptions) -> Self {
        Self {
            base_url: base_url.into(),
            options,
            visited: HashSet::new(),
            frontier: HashSet::new(),
        }
    }

    /// Seeds the frontier with the start URL
    pub fn seed(&mut self, start: NormalizedUrl) {
        self.frontier.insert(start);
    }

    /// Snapshots and clears the frontier for the next wave
    ///
    /// The snapshot is sorted so wave processing is deterministic;
    /// membership, not order, is what correctness depends on.
    pub fn take_wave(&mut self) -> Vec<NormalizedUrl> {
        let mut wave: Vec<NormalizedUrl> = self.frontier.drain().collect();
        wave.sort();
        wave
    }

    /// Applies the admission rules for this session to a URL
    pub fn should_crawl(&self, url: &str) -> bool {
        should_crawl(
            url,
            &self.base_url,
            &self.options.admission_rules(),
            &self.visited,
        )
    }

    /// Marks a URL as fetched
    pub fn mark_visited(&mut self, url: NormalizedUrl) {
        self.visited.insert(url);
    }

    /// Queues a URL for the next wave unless it was already fetched
    pub fn enqueue(&mut self, url: NormalizedUrl) {
        if !self.visited.contains(&url) {
            self.frontier.insert(url);
        }
    }

    pub fn frontier_is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
