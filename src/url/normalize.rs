use crate::UrlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Canonical string form of a URL, used as the sole dedup key
///
/// The form is `scheme://host[:port]` + path with trailing slashes stripped
/// + `?query` verbatim; the fragment is dropped. The host is lower-cased by
/// the URL parser (WHATWG behavior); path and query bytes are preserved
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL into its canonical dedup form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme
/// 3. Strip the fragment
/// 4. Strip trailing slashes from the path (the root path becomes empty)
/// 5. Keep the query string verbatim if present
///
/// Normalization is idempotent: normalizing an already-normalized URL
/// returns the same string.
///
/// # Examples
///
/// ```
/// use pagesift::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page/#section").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?;

    let mut normalized = format!("{}://{}", url.scheme(), host);

    // Non-default ports are part of the canonical form; default ports are
    // already dropped by the parser.
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    normalized.push_str(url.path().trim_end_matches('/'));

    if let Some(query) = url.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    Ok(NormalizedUrl(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_strip_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_root_path_stripped() {
        let result = normalize_url("https://example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com");
    }

    #[test]
    fn test_bare_host() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com");
    }

    #[test]
    fn test_query_kept_verbatim() {
        let result = normalize_url("https://example.com/search?q=rust&page=2").unwrap();
        assert_eq!(result.as_str(), "https://example.com/search?q=rust&page=2");
    }

    #[test]
    fn test_query_kept_on_trailing_slash_path() {
        let result = normalize_url("https://example.com/search/?q=rust").unwrap();
        assert_eq!(result.as_str(), "https://example.com/search?q=rust");
    }

    #[test]
    fn test_path_case_preserved() {
        let result = normalize_url("https://example.com/Some/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Some/Page");
    }

    #[test]
    fn test_host_lowercased_by_parser() {
        let result = normalize_url("https://EXAMPLE.com/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_non_default_port_kept() {
        let result = normalize_url("http://127.0.0.1:8080/page/").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/page");
    }

    #[test]
    fn test_default_port_dropped() {
        let result = normalize_url("https://example.com:443/page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/",
            "https://example.com/page/#frag",
            "https://example.com/a//",
            "http://127.0.0.1:8080/x?b=2&a=1",
            "https://example.com/Page?q=Hello%20World",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let result = normalize_url("mailto:foo@bar.com");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url_rejected() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(normalize_url("/just/a/path").is_err());
    }
}
