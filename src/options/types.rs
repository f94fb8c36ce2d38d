use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default CSS selector for main-content extraction
pub const DEFAULT_MAIN_CONTENT_SELECTOR: &str = "main, article, .main-content";

/// Tags removed from every document before extraction
pub const DEFAULT_EXCLUDE_TAGS: &[&str] = &["script", "style", "noscript"];

/// Default number of fetch attempts for retryable transport failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Output formats the extractor can generate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Text,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Text => "text",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// A scripted browser action, executed in order after page load
///
/// Unknown action types deserialize to [`Action::Unknown`] and are ignored
/// during execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Pause for the given duration
    Wait {
        #[serde(default = "default_wait_milliseconds")]
        milliseconds: u64,
    },

    /// Click the first element matching the selector
    Click { selector: String },

    /// Scroll the viewport vertically by the given pixel count
    Scroll {
        #[serde(default = "default_scroll_pixels")]
        pixels: i64,
    },

    /// Fill the first element matching the selector with text
    Write { selector: String, text: String },

    /// Press a keyboard key against the focused element
    Press { key: String },

    #[serde(other)]
    Unknown,
}

fn default_wait_milliseconds() -> u64 {
    1000
}

fn default_scroll_pixels() -> i64 {
    1000
}

/// Options controlling how a single page is fetched and processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Narrow extraction to the first subtree matching
    /// `main_content_selector`
    pub extract_main_content: bool,

    /// CSS selector for main-content selection
    pub main_content_selector: String,

    /// Capture anchors with resolved absolute URLs
    pub include_links: bool,

    /// CSS selectors removed from the document before extraction
    pub exclude_tags: Vec<String>,

    /// Render the page in a headless browser instead of a direct GET
    pub use_browser: bool,

    /// Milliseconds to wait after page load (browser mode)
    pub wait_for: Option<u64>,

    /// Ordered action sequence executed against the rendered page
    pub actions: Vec<Action>,

    /// Milliseconds to wait after the action sequence (browser mode)
    pub post_action_wait: Option<u64>,

    /// Fetch attempts for retryable transport failures (direct mode)
    pub max_retries: u32,

    /// Upstream proxy URL (direct mode only)
    pub proxy: Option<String>,

    /// Apply the markdown cleanup pass to generated markdown
    pub clean_markdown: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            extract_main_content: false,
            main_content_selector: DEFAULT_MAIN_CONTENT_SELECTOR.to_string(),
            include_links: false,
            exclude_tags: DEFAULT_EXCLUDE_TAGS.iter().map(|s| s.to_string()).collect(),
            use_browser: false,
            wait_for: None,
            actions: Vec::new(),
            post_action_wait: None,
            max_retries: DEFAULT_MAX_RETRIES,
            proxy: None,
            clean_markdown: true,
        }
    }
}

/// Options controlling a crawl traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlOptions {
    /// Maximum traversal depth; unbounded when absent
    pub max_depth: Option<u32>,

    /// Best-effort cap on the number of pages fetched
    pub max_pages: Option<usize>,

    /// Output formats generated for every crawled page
    pub formats: Vec<OutputFormat>,

    /// Path patterns to reject (trailing `*` is a prefix match, otherwise
    /// exact)
    pub exclude_paths: Vec<String>,

    /// When non-empty, only paths matching one of these patterns are
    /// admitted
    pub include_only_paths: Vec<String>,

    /// Permit cross-domain targets
    pub allow_backwards: bool,

    /// Treat subdomains of the start URL's domain as same-domain
    pub include_subdomains: bool,

    /// Per-page fetch and extraction options
    pub page_options: PageOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_pages: None,
            formats: vec![OutputFormat::Markdown],
            exclude_paths: Vec::new(),
            include_only_paths: Vec::new(),
            allow_backwards: false,
            include_subdomains: false,
            page_options: PageOptions::default(),
        }
    }
}

/// Options controlling a map operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Truncate the result list to this many URLs
    pub max_pages: Option<usize>,

    /// Path patterns to reject
    pub exclude_paths: Vec<String>,

    /// When non-empty, only paths matching one of these patterns are kept
    pub include_only_paths: Vec<String>,

    /// Permit cross-domain targets
    pub allow_backwards: bool,

    /// Treat subdomains of the start URL's domain as same-domain
    pub include_subdomains: bool,

    /// Case-insensitive substring filter applied to the result list
    pub search: Option<String>,

    /// Fetch options for the single page retrieval
    pub page_options: PageOptions,
}
