//! Scripted browser fetching
//!
//! Launches an isolated headless browser per call, navigates, runs the
//! scripted action sequence, and returns the fully rendered DOM. Failures
//! are fatal for the URL; no retry logic applies, and proxies are not
//! supported in this mode.

use crate::fetch::agent::random_user_agent;
use crate::fetch::{FetchError, FetchedPage};
use crate::options::{Action, PageOptions};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;

/// Fetches a URL by rendering it in a fresh headless browser
///
/// The browser context is created and torn down per call, which is
/// resource-expensive; pooling is a possible later optimization, not a
/// correctness requirement.
pub async fn fetch_with_browser(
    url: &str,
    options: &PageOptions,
) -> Result<FetchedPage, FetchError> {
    let config = BrowserConfig::builder()
        .build()
        .map_err(FetchError::Rendering)?;

    let (mut browser, mut handler) = Browser::launch(config).await.map_err(rendering)?;

    // The CDP event handler must be driven for the connection to make
    // progress; it runs until the browser closes.
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = drive_page(&browser, url, options).await;

    if let Err(e) = browser.close().await {
        tracing::warn!(%url, error = %e, "failed to close browser");
    }
    let _ = browser.wait().await;
    handler_task.abort();

    result
}

async fn drive_page(
    browser: &Browser,
    url: &str,
    options: &PageOptions,
) -> Result<FetchedPage, FetchError> {
    let page = browser.new_page("about:blank").await.map_err(rendering)?;

    let user_agent = SetUserAgentOverrideParams::builder()
        .user_agent(random_user_agent())
        .build()
        .map_err(FetchError::Rendering)?;
    page.set_user_agent(user_agent).await.map_err(rendering)?;

    page.goto(url).await.map_err(rendering)?;
    page.wait_for_navigation().await.map_err(rendering)?;

    if let Some(wait_for) = options.wait_for {
        tokio::time::sleep(Duration::from_millis(wait_for)).await;
    }

    for action in &options.actions {
        apply_action(&page, action).await?;
    }

    if let Some(post_action_wait) = options.post_action_wait {
        tokio::time::sleep(Duration::from_millis(post_action_wait)).await;
    }

    let content = page.content().await.map_err(rendering)?;
    let final_url = page
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| url.to_string());

    if let Err(e) = page.close().await {
        tracing::debug!(%url, error = %e, "failed to close page");
    }

    Ok(FetchedPage {
        content,
        final_url,
        // Browser mode has no transport status to report; a rendered page
        // counts as a success.
        status: 200,
    })
}

/// Executes one scripted action against the rendered page
async fn apply_action(page: &Page, action: &Action) -> Result<(), FetchError> {
    match action {
        Action::Wait { milliseconds } => {
            tokio::time::sleep(Duration::from_millis(*milliseconds)).await;
        }
        Action::Click { selector } => {
            page.find_element(selector.as_str())
                .await
                .map_err(rendering)?
                .click()
                .await
                .map_err(rendering)?;
        }
        Action::Scroll { pixels } => {
            page.evaluate(format!("window.scrollBy(0, {pixels});"))
                .await
                .map_err(rendering)?;
        }
        Action::Write { selector, text } => {
            page.find_element(selector.as_str())
                .await
                .map_err(rendering)?
                .click()
                .await
                .map_err(rendering)?
                .type_str(text)
                .await
                .map_err(rendering)?;
        }
        Action::Press { key } => {
            // Key presses go to the focused element; fall back to the body
            // when nothing holds focus.
            let target = match page.find_element(":focus").await {
                Ok(element) => element,
                Err(_) => page.find_element("body").await.map_err(rendering)?,
            };
            target.press_key(key.as_str()).await.map_err(rendering)?;
        }
        Action::Unknown => {
            tracing::debug!("ignoring unknown browser action");
        }
    }
    Ok(())
}

fn rendering(e: impl std::fmt::Display) -> FetchError {
    FetchError::Rendering(e.to_string())
}
