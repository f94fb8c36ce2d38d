use url::Url;

/// Checks whether two URLs belong to the same domain
///
/// With `include_subdomains` false, the full hosts are compared. With
/// `include_subdomains` true, only the last two dot-separated host labels
/// are compared, so `a.example.com` and `b.example.com` match.
///
/// # Known limitation
///
/// The last-two-labels heuristic does not handle multi-label public
/// suffixes: `a.co.uk` and `b.co.uk` are wrongly treated as the same
/// domain. This is inherited behavior, kept deliberately rather than
/// silently changed.
///
/// # Examples
///
/// ```
/// use pagesift::url::same_domain;
///
/// assert!(same_domain("https://example.com/a", "https://example.com/b", false));
/// assert!(!same_domain("https://a.example.com", "https://b.example.com", false));
/// assert!(same_domain("https://a.example.com", "https://b.example.com", true));
/// ```
pub fn same_domain(a: &str, b: &str, include_subdomains: bool) -> bool {
    let (Ok(url_a), Ok(url_b)) = (Url::parse(a), Url::parse(b)) else {
        return false;
    };
    let (Some(host_a), Some(host_b)) = (url_a.host_str(), url_b.host_str()) else {
        return false;
    };

    if include_subdomains {
        registrable_tail(host_a) == registrable_tail(host_b)
    } else {
        host_a == host_b
    }
}

/// Returns the last two dot-separated labels of a host
fn registrable_tail(host: &str) -> (Option<&str>, Option<&str>) {
    let mut labels = host.rsplit('.');
    (labels.next(), labels.next())
}
