use crate::url::domain::clean_host;
use url::Url;

/// Normalizes a URL for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; if it fails (or has no host) return the input unchanged
/// 2. Lowercase the scheme and host
/// 3. Drop the port when it is the scheme's default
/// 4. Strip leading `www.` labels and trailing dots from the host
/// 5. Collapse the root path `/` to empty, strip trailing slashes elsewhere
/// 6. Keep the query string, drop the fragment
///
/// The function is total and idempotent: normalizing its own output returns
/// the same string.
///
/// # Examples
///
/// ```
/// use pagewalker::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTPS://WWW.Example.com:443/docs/?a=1#top"), "https://example.com/docs?a=1");
/// assert_eq!(normalize_url("https://example.com/"), "https://example.com");
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let Ok(url) = Url::parse(url_str) else {
        return url_str.to_string();
    };

    let Some(host) = url.host_str() else {
        return url_str.to_string();
    };

    let host = clean_host(host);
    if host.is_empty() {
        return url_str.to_string();
    }

    let mut normalized = String::with_capacity(url_str.len());
    normalized.push_str(url.scheme());
    normalized.push_str("://");

    if !url.username().is_empty() {
        normalized.push_str(url.username());
        if let Some(password) = url.password() {
            normalized.push(':');
            normalized.push_str(password);
        }
        normalized.push('@');
    }

    normalized.push_str(&host);

    // Url::port() is None for the scheme's default port
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    let path = url.path();
    if path != "/" {
        normalized.push_str(path.trim_end_matches('/'));
    }

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        normalized.push('?');
        normalized.push_str(query);
    }

    normalized
}

/// Resolves a possibly-relative reference against a base URL
///
/// Uses RFC 3986 resolution, so scheme-relative (`//host/x`), path-relative
/// (`../x`), query-only (`?q=1`) and fragment-only (`#top`) references all
/// resolve the way a browser would resolve them. If the base cannot be parsed
/// or the join fails, the reference is returned unchanged.
///
/// # Examples
///
/// ```
/// use pagewalker::url::absolutize;
///
/// assert_eq!(absolutize("https://example.com/a/b", "../c"), "https://example.com/c");
/// assert_eq!(absolutize("https://example.com/a", "//cdn.example.com/x"), "https://cdn.example.com/x");
/// ```
pub fn absolutize(base: &str, href: &str) -> String {
    match Url::parse(base) {
        Ok(base) => base
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string()),
        Err(_) => href.to_string(),
    }
}
