//! Integration tests
//!
//! These use wiremock mock servers to exercise fetching, extraction,
//! crawling, and job tracking end-to-end.

mod crawl_tests;
mod jobs_tests;
mod scrape_tests;
