use crate::options::types::{CrawlOptions, MapOptions, PageOptions};
use crate::options::validation::{
    validate_crawl_options, validate_map_options, validate_page_options,
};
use crate::options::OptionsError;
use serde::Deserialize;
use std::path::Path;

/// Options loaded from a TOML file
///
/// Each table is optional; absent tables fall back to the engine defaults.
///
/// ```toml
/// [crawl]
/// max_depth = 2
/// formats = ["markdown", "text"]
///
/// [page]
/// extract_main_content = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptionsFile {
    pub crawl: Option<CrawlOptions>,
    pub map: Option<MapOptions>,
    pub page: Option<PageOptions>,
}

/// Loads and validates an options file from the given path
pub fn load_options(path: &Path) -> Result<OptionsFile, OptionsError> {
    let content = std::fs::read_to_string(path)?;
    let options: OptionsFile = toml::from_str(&content)?;

    if let Some(crawl) = &options.crawl {
        validate_crawl_options(crawl).map_err(|e| OptionsError::Validation(e.to_string()))?;
    }
    if let Some(map) = &options.map {
        validate_map_options(map).map_err(|e| OptionsError::Validation(e.to_string()))?;
    }
    if let Some(page) = &options.page {
        validate_page_options(page).map_err(|e| OptionsError::Validation(e.to_string()))?;
    }

    Ok(options)
}
