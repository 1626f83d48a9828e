//! Parsing of twitter.com / x.com status links.

use regex::Regex;
use std::sync::LazyLock;

static STATUS_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/\w+/status/(\d+)")
        .expect("status link pattern")
});

static SHORT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://t\.co/\w+").expect("short link pattern"));

/// Tweet id of a status link, `None` for any other URL
pub fn tweet_id_from_url(url: &str) -> Option<String> {
    STATUS_LINK
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Drops `https://t.co/...` short links (attached media) from tweet text
pub fn strip_short_links(text: &str) -> String {
    SHORT_LINK.replace_all(text, "").trim().to_string()
}
