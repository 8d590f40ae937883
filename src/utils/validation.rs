//! Configuration validation utilities.
//!
//! Small value checks shared by the configuration record and the lab
//! builders.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static BANDWIDTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?[KMG]?$").expect("Invalid bandwidth regex"));

static URL_HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://([^/:?#]+)").expect("Invalid url regex"));

/// Return the first name that appears more than once
///
/// # Examples
/// ```
/// use labtopo::utils::validation::find_duplicate;
///
/// assert_eq!(find_duplicate(["h1", "h2", "h1"]), Some("h1".to_string()));
/// assert_eq!(find_duplicate(["h1", "h2"]), None);
/// ```
pub fn find_duplicate<'a, I>(names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name)).map(str::to_string)
}

/// Check an iperf style bandwidth value (`100M`, `1.5G`, `512K`, `1000`)
pub fn is_valid_bandwidth(value: &str) -> bool {
    BANDWIDTH_PATTERN.is_match(value)
}

/// Extract the host part of a URL, e.g. `your-site.onrender.com`
///
/// Falls back to the input with any scheme stripped when the value does
/// not look like a URL.
pub fn url_host(url: &str) -> String {
    match URL_HOST_PATTERN.captures(url) {
        Some(caps) => caps[1].to_string(),
        None => url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string(),
    }
}
