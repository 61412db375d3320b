//! Domain classification
//!
//! Maps any URL string to the key used to group tabs. The function is total:
//! stored data may hold arbitrary strings, so malformed input falls into
//! [`OTHER`] instead of failing.

use url::Url;

pub const BROWSER_INTERNAL: &str = "Browser Internal";
pub const LOCAL_FILES: &str = "Local Files";
pub const BROWSER_PAGES: &str = "Browser Pages";
pub const OTHER: &str = "Other";

/// The browser's own settings/internals schemes
const INTERNAL_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-untrusted://",
    "chrome-search://",
    "edge://",
    "brave://",
    "opera://",
    "vivaldi://",
    "devtools://",
];

/// Browser-native pages that are not web content
const PAGE_PREFIXES: &[&str] = &[
    "about:",
    "chrome-extension://",
    "moz-extension://",
    "extension://",
    "view-source:",
];

pub fn classify(url: &str) -> String {
    let lower = url.trim().to_ascii_lowercase();

    if INTERNAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return BROWSER_INTERNAL.to_string();
    }
    if lower.starts_with("file://") {
        return LOCAL_FILES.to_string();
    }
    if PAGE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return BROWSER_PAGES.to_string();
    }

    match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                host.strip_prefix("www.").unwrap_or(host).to_string()
            }
            _ => OTHER.to_string(),
        },
        Err(_) => OTHER.to_string(),
    }
}
