//! Direct HTTP fetching
//!
//! Issues a GET following redirects, with a fixed 30-second timeout and a
//! randomized User-Agent per client. Connection and timeout failures are
//! retried with exponential backoff; any other client-level failure is
//! immediate. Non-success HTTP statuses are not errors: the body passes
//! through with the status recorded.

use crate::fetch::agent::random_user_agent;
use crate::fetch::{FetchError, FetchedPage};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest backoff exponent, bounding the sleep at 64 seconds
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Reusable direct-mode fetcher
///
/// The underlying client (with its randomized User-Agent) is built once and
/// reused across fetches for the fetcher's lifetime. Cloning is cheap and
/// shares the client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with the default 30-second timeout
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a fetcher with a custom request timeout
    ///
    /// Mainly useful for tests that exercise the retry path without
    /// waiting out the full default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_client(timeout, None)?;
        Ok(Self { client, timeout })
    }

    /// Fetches a URL, following redirects
    ///
    /// # Retry Policy
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout / connection refused | Retry, sleeping 2^attempt seconds |
    /// | Retries exhausted | `FetchError::RetriesExhausted` |
    /// | Any other client error | Immediate `FetchError::Transport` |
    /// | HTTP 4xx/5xx | Success; status recorded on the page |
    ///
    /// A proxy, when given, applies to this fetch only. reqwest scopes
    /// proxies to a client, so a dedicated client is built for the call.
    pub async fn fetch(
        &self,
        url: &str,
        max_retries: u32,
        proxy: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        let proxied;
        let client = match proxy {
            Some(proxy_url) => {
                proxied = build_client(self.timeout, Some(proxy_url))?;
                &proxied
            }
            None => &self.client,
        };

        let max_attempts = max_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = async {
                let response = client.get(url).send().await?;
                let status = response.status().as_u16();
                let final_url = response.url().to_string();
                let body = response.text().await?;
                Ok::<FetchedPage, reqwest::Error>(FetchedPage {
                    content: body,
                    final_url,
                    status,
                })
            }
            .await;

            match outcome {
                Ok(page) => return Ok(page),
                Err(e) if e.is_timeout() || e.is_connect() => {
                    if attempt >= max_attempts {
                        return Err(FetchError::RetriesExhausted {
                            attempts: max_attempts,
                            source: e,
                        });
                    }
                    let exponent = (attempt - 1).min(MAX_BACKOFF_EXPONENT);
                    let delay = Duration::from_secs(1 << exponent);
                    tracing::debug!(
                        %url,
                        attempt,
                        ?delay,
                        error = %e,
                        "transient fetch failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(FetchError::Transport(e)),
            }
        }
    }
}

fn build_client(timeout: Duration, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(random_user_agent())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }

    builder.build()
}
