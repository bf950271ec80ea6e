use once_cell::sync::Lazy;
use regex::Regex;

/// Matches URLs ending in a common binary file extension, with an optional query string
static BINARY_RESOURCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(pdf|zip|jpg|jpeg|png|gif|webp|mp4|mov|avi|mp3)(\?.*)?$")
        .expect("Invalid binary resource regex")
});

/// Returns true if the URL points at a binary file the crawler should not open
///
/// The check is conservative: only a short list of document, archive, image,
/// video and audio extensions is recognized.
///
/// # Examples
///
/// ```
/// use pagewalker::url::is_binary_resource;
///
/// assert!(is_binary_resource("https://example.com/report.PDF"));
/// assert!(is_binary_resource("https://example.com/a.zip?download=1"));
/// assert!(!is_binary_resource("https://example.com/pdf-guide"));
/// ```
pub fn is_binary_resource(url: &str) -> bool {
    BINARY_RESOURCE_REGEX.is_match(url)
}
