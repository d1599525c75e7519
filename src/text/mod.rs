//! Text normalization.
//!
//! Normalized text is the key space of the embedding cache, so every lookup must go through
//! [`normalize`]. The only rewrite is URL substitution: each `http(s)` URL becomes a short tag
//! carrying its host and first two path segments. Everything else is left byte-for-byte intact.


use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

/// Tag emitted for URLs that cannot be parsed.
pub const UNKNOWN_URL_TAG: &str = "<url>: (unknown)";

/// Prefix shared by every URL tag.
pub const URL_TAG_PREFIX: &str = "<url>:";

/// Maximum number of path segments kept in a URL tag.
pub const MAX_PATH_SEGMENTS: usize = 2;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("URL pattern is a valid regex")
});

/// Canonicalizes raw text for embedding and cache lookup.
///
/// Missing and empty input both normalize to the empty string. The function is idempotent:
/// tags never contain `://`, so a second pass finds nothing to rewrite.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        None | Some("") => String::new(),
        Some(text) => URL_PATTERN
            .replace_all(text, |caps: &Captures<'_>| clean_url(&caps[0]))
            .into_owned(),
    }
}

/// Rewrites a single URL into its `<url>: (host/seg1/seg2)` tag.
///
/// The URL must parse, but the tag is cut from the raw text: the host keeps its Unicode form
/// (lowercased, one leading `www.` removed, no userinfo or port) and path segments are taken
/// verbatim, without percent-encoding or dot-segment resolution. A URL without path segments
/// yields `<url>: (host)`; one that fails to parse (or has no host) yields [`UNKNOWN_URL_TAG`].
pub fn clean_url(raw: &str) -> String {
    if Url::parse(raw).is_err() {
        return UNKNOWN_URL_TAG.to_string();
    }

    let Some((authority, path)) = split_raw_url(raw) else {
        return UNKNOWN_URL_TAG.to_string();
    };

    let Some(host) = host_of(authority) else {
        return UNKNOWN_URL_TAG.to_string();
    };

    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .take(MAX_PATH_SEGMENTS)
        .collect();

    if segments.is_empty() {
        format!("{URL_TAG_PREFIX} ({host})")
    } else {
        format!("{URL_TAG_PREFIX} ({host}/{})", segments.join("/"))
    }
}

/// Returns the lowercased host of a raw URL with any `www.` prefix removed.
///
/// `None` when the URL does not parse or has an empty host.
pub fn extract_domain(raw: &str) -> Option<String> {
    Url::parse(raw).ok()?;
    let (authority, _) = split_raw_url(raw)?;
    host_of(authority)
}

/// Splits `scheme://authority/path?query#fragment` into `(authority, path)`.
fn split_raw_url(raw: &str) -> Option<(&str, &str)> {
    let (_, rest) = raw.split_once("://")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    Some(match rest.find('/') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    })
}

fn host_of(authority: &str) -> Option<String> {
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = match host.find(']') {
        Some(end) if host.starts_with('[') => &host[..=end],
        _ => host.split(':').next().unwrap_or_default(),
    };
    let host = host.to_lowercase();
    if host.is_empty() {
        return None;
    }
    match host.strip_prefix("www.") {
        Some(stripped) if !stripped.is_empty() => Some(stripped.to_string()),
        _ => Some(host),
    }
}

/// Returns every URL-like substring of `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}
