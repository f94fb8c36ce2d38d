use crate::options::{CrawlOptions, MapOptions};
use crate::url::domain::same_domain;
use crate::url::normalize::{normalize_url, NormalizedUrl};
use std::collections::HashSet;
use url::Url;

/// Path fragments that are never worth fetching, matched case-insensitively
/// as substrings of the URL path
const INFRASTRUCTURE_PATHS: &[&str] = &[
    "/cdn-cgi/",
    "/wp-admin/",
    "/wp-includes/",
    "/assets/",
    "/static/",
];

/// Borrowed view of the option fields the admission filter consults
///
/// Both [`CrawlOptions`] and [`MapOptions`] project into this so the rule
/// set is written once.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionRules<'a> {
    pub allow_backwards: bool,
    pub include_subdomains: bool,
    pub max_pages: Option<usize>,
    pub exclude_paths: &'a [String],
    pub include_only_paths: &'a [String],
}

impl CrawlOptions {
    /// Projects the admission-relevant fields of these options
    pub fn admission_rules(&self) -> AdmissionRules<'_> {
        AdmissionRules {
            allow_backwards: self.allow_backwards,
            include_subdomains: self.include_subdomains,
            max_pages: self.max_pages,
            exclude_paths: &self.exclude_paths,
            include_only_paths: &self.include_only_paths,
        }
    }
}

impl MapOptions {
    /// Projects the admission-relevant fields of these options
    pub fn admission_rules(&self) -> AdmissionRules<'_> {
        AdmissionRules {
            allow_backwards: self.allow_backwards,
            include_subdomains: self.include_subdomains,
            max_pages: self.max_pages,
            exclude_paths: &self.exclude_paths,
            include_only_paths: &self.include_only_paths,
        }
    }
}

/// Decides whether a discovered URL is eligible to be fetched
///
/// The rules are evaluated in a fixed order, short-circuiting on the first
/// failure:
///
/// 1. The URL must have an http or https scheme
/// 2. Unless `allow_backwards`, the URL must be same-domain as `base_url`
/// 3. The normalized form must not already be in the visited set
/// 4. If `max_pages` is set, the visited count must be below it (a
///    best-effort cap, checked at admission time)
/// 5. The path must not contain an infrastructure fragment
///    (`/cdn-cgi/`, `/wp-admin/`, `/wp-includes/`, `/assets/`, `/static/`)
/// 6. The path must not match any `exclude_paths` pattern
/// 7. If `include_only_paths` is non-empty, the path must match at least
///    one of its patterns
///
/// Patterns ending in `*` are prefix matches; all others match exactly.
pub fn should_crawl(
    url: &str,
    base_url: &str,
    rules: &AdmissionRules<'_>,
    visited: &HashSet<NormalizedUrl>,
) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    if !rules.allow_backwards && !same_domain(url, base_url, rules.include_subdomains) {
        return false;
    }

    let Ok(normalized) = normalize_url(url) else {
        return false;
    };
    if visited.contains(&normalized) {
        return false;
    }

    if let Some(max_pages) = rules.max_pages {
        if visited.len() >= max_pages {
            return false;
        }
    }

    let path = parsed.path();
    let lower_path = path.to_ascii_lowercase();
    if INFRASTRUCTURE_PATHS
        .iter()
        .any(|fragment| lower_path.contains(fragment))
    {
        return false;
    }

    if rules
        .exclude_paths
        .iter()
        .any(|pattern| matches_path_pattern(pattern, path))
    {
        return false;
    }

    if !rules.include_only_paths.is_empty()
        && !rules
            .include_only_paths
            .iter()
            .any(|pattern| matches_path_pattern(pattern, path))
    {
        return false;
    }

    true
}

/// Checks a path against a single pattern
///
/// A trailing `*` makes the pattern a prefix match; otherwise the match is
/// exact.
pub fn matches_path_pattern(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        path.starts_with(prefix)
    } else {
        path == pattern
    }
}
