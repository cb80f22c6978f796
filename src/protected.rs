/// Detection of browser-internal pages that extensions may not script
use url::Url;

/// Whether `url` belongs to a scheme the browser protects from content scripts.
///
/// Parseable URLs are judged by scheme so `CHROME://settings` is caught too;
/// anything else is compared against the raw prefixes.
pub fn is_protected_url(url: &str, protected_prefixes: &[String]) -> bool {
    let url = url.trim();
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        return protected_prefixes
            .iter()
            .any(|prefix| prefix_scheme(prefix) == scheme);
    }

    protected_prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
}

// "chrome-extension://" -> "chrome-extension", "about:" -> "about"
fn prefix_scheme(prefix: &str) -> &str {
    prefix.split(':').next().unwrap_or(prefix)
}
