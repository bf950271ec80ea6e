use url::Url;

/// Extracts a comparable host from a URL
///
/// The host is lowercased, the ports 80 and 443 are dropped whatever the
/// scheme, and leading `www.` labels and trailing dots are stripped. Other
/// ports are kept, so `example.com:8080` and `example.com` differ.
///
/// # Returns
///
/// The normalized host, or an empty string if the URL is malformed or has no
/// host
///
/// # Examples
///
/// ```
/// use pagewalker::url::normalize_host;
///
/// assert_eq!(normalize_host("https://WWW.Example.com:443/a"), "example.com");
/// assert_eq!(normalize_host("http://example.com:8080/"), "example.com:8080");
/// assert_eq!(normalize_host("/relative"), "");
/// ```
pub fn normalize_host(url_str: &str) -> String {
    let Ok(url) = Url::parse(url_str) else {
        return String::new();
    };

    let Some(host) = url.host_str() else {
        return String::new();
    };

    let host = clean_host(host);
    match url.port_or_known_default() {
        Some(port) if port != 80 && port != 443 && !host.is_empty() => {
            format!("{}:{}", host, port)
        }
        _ => host,
    }
}

/// Returns true if both URLs resolve to the same normalized host
///
/// URLs without a usable host never match anything, including each other:
/// two hostless URLs both normalize to an empty host, yet compare as
/// different domains rather than equal ones.
pub fn same_domain(a: &str, b: &str) -> bool {
    let host_a = normalize_host(a);
    !host_a.is_empty() && host_a == normalize_host(b)
}

/// Lowercases a host and strips leading `www.` labels and trailing dots
pub(crate) fn clean_host(host: &str) -> String {
    let mut host = host.to_lowercase();

    while let Some(rest) = host.strip_prefix("www.") {
        host = rest.to_string();
    }

    host.trim_end_matches('.').to_string()
}
