//! Page fetching
//!
//! Two mutually exclusive strategies: direct HTTP GET with retry/backoff
//! ([`HttpFetcher`]) and scripted headless-browser rendering
//! ([`fetch_with_browser`]). Both return the same [`FetchedPage`] shape.

mod agent;
mod browser;
mod http;

pub use agent::random_user_agent;
pub use browser::fetch_with_browser;
pub use http::HttpFetcher;

use thiserror::Error;

/// Raw result of fetching one page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw markup (direct mode: response body; browser mode: serialized DOM)
    pub content: String,

    /// URL after redirects or in-page navigation
    pub final_url: String,

    /// HTTP status (browser mode reports a fixed 200 on success)
    pub status: u16,
}

/// Fetch-level errors, classified for retry policy
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or timeout failures persisted through every allowed
    /// attempt
    #[error("connection error after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Non-retryable client failure (malformed request, body read error)
    #[error("client error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Browser navigation or action failure; fatal for the URL, no retry
    #[error("browser rendering failed: {0}")]
    Rendering(String),

    /// The server answered but sent nothing usable
    #[error("no content retrieved from the URL")]
    EmptyBody,
}
