use crate::options::types::{CrawlOptions, MapOptions, PageOptions};
use crate::PagesiftError;
use scraper::Selector;

/// Validates crawl options at call entry
///
/// Depth cannot be negative by construction; the checks here cover the
/// constraints the type system cannot express.
pub fn validate_crawl_options(options: &CrawlOptions) -> Result<(), PagesiftError> {
    if let Some(max_pages) = options.max_pages {
        if max_pages == 0 {
            return Err(PagesiftError::Validation(
                "max_pages must be a positive integer".to_string(),
            ));
        }
    }

    validate_page_options(&options.page_options)
}

/// Validates map options at call entry
pub fn validate_map_options(options: &MapOptions) -> Result<(), PagesiftError> {
    if let Some(max_pages) = options.max_pages {
        if max_pages == 0 {
            return Err(PagesiftError::Validation(
                "max_pages must be a positive integer".to_string(),
            ));
        }
    }

    validate_page_options(&options.page_options)
}

/// Validates per-page options
pub fn validate_page_options(options: &PageOptions) -> Result<(), PagesiftError> {
    if options.max_retries == 0 {
        return Err(PagesiftError::Validation(
            "max_retries must be at least 1".to_string(),
        ));
    }

    if options.extract_main_content {
        Selector::parse(&options.main_content_selector).map_err(|e| {
            PagesiftError::Validation(format!(
                "invalid main content selector '{}': {e}",
                options.main_content_selector
            ))
        })?;
    }

    Ok(())
}
