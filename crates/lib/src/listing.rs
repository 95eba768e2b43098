//! # Listing Identifier
//!
//! Recognizes marketplace item pages among generic web-search results and
//! extracts their numeric item identifier.

use regex::Regex;
use std::sync::LazyLock;

/// Hostname fragment shared by every marketplace domain.
pub const MARKETPLACE_HOST_FRAGMENT: &str = "ebay";

/// Extraction rules for the whole URL, in priority order.
static URL_RULES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // /itm/123456 or /itm/some-title/123456
        Regex::new(r"/itm/(?:[^/]+/)?(\d+)").expect("valid /itm/ pattern"),
        Regex::new(r"item=(\d+)").expect("valid item= pattern"),
        Regex::new(r"ItemId=(\d+)").expect("valid ItemId= pattern"),
    ]
});

/// A bare 12-digit item id occupying a full path segment.
static PATH_SEGMENT_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{12})(?:/|$)").expect("valid segment pattern"));

/// Returns true when the URL belongs to the marketplace domain.
///
/// Check this before calling `identify`: its patterns are not unique to the
/// marketplace and would match unrelated sites.
pub fn is_marketplace_url(url: &str) -> bool {
    url.to_lowercase().contains(MARKETPLACE_HOST_FRAGMENT)
}

/// Extracts the item identifier from a listing URL.
///
/// Rules are tried in order and the first match wins:
/// 1. `/itm/` with an optional slug segment, then digits.
/// 2. `item=` followed by digits.
/// 3. `ItemId=` followed by digits.
/// 4. exactly 12 digits forming a whole path segment.
///
/// Returns `None` for a non-listing page.
pub fn identify(url: &str) -> Option<String> {
    for rule in URL_RULES.iter() {
        if let Some(caps) = rule.captures(url) {
            return Some(caps[1].to_string());
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    PATH_SEGMENT_RULE
        .captures(path)
        .map(|caps| caps[1].to_string())
}
