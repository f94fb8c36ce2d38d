//! Typed options for scrape, crawl, and map operations
//!
//! The engine takes strongly-typed option structs with explicit defaults;
//! validation happens once at call entry, never per-field at arbitrary
//! depth. Options can also be loaded from a TOML file.
//!
//! # Example
//!
//! ```no_run
//! use pagesift::options::load_options;
//! use std::path::Path;
//!
//! let options = load_options(Path::new("options.toml")).unwrap();
//! if let Some(crawl) = options.crawl {
//!     println!("max depth: {:?}", crawl.max_depth);
//! }
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{load_options, OptionsFile};
pub use types::{Action, CrawlOptions, MapOptions, OutputFormat, PageOptions};
pub use validation::{validate_crawl_options, validate_map_options, validate_page_options};

use thiserror::Error;

/// Errors from loading or validating an options file
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
