//! HTTP cache control module
//!
//! Provides the `Accept`-driven cache policy, `ETag` generation and
//! conditional request checks.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::{SystemTime, UNIX_EPOCH};

/// One year, for fingerprinted assets whose URL changes with their content
pub const IMMUTABLE_MAX_AGE: u32 = 31_536_000;

const HTML_MEDIA_TYPE: &[u8] = b"text/html";

/// Cache-Control policy chosen per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Long-lived caching for static assets
    Immutable,
    /// Always revalidate, for HTML shells that change under a stable URL
    Revalidate,
}

impl CachePolicy {
    /// Pick the policy from the request's `Accept` headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if accepts_html(headers.get_all(ACCEPT)) {
            Self::Revalidate
        } else {
            Self::Immutable
        }
    }

    /// Convert to Cache-Control header value
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Immutable => "max-age=31536000",
            Self::Revalidate => "no-cache, no-store, must-revalidate",
        }
    }
}

/// Check whether any `Accept` value mentions `text/html`.
///
/// Plain case-sensitive substring match over every value, in order. Quality
/// parameters and wildcards are not interpreted, so `*/*` alone does not count.
pub fn accepts_html<'a>(values: impl IntoIterator<Item = &'a HeaderValue>) -> bool {
    values.into_iter().any(|value| {
        value
            .as_bytes()
            .windows(HTML_MEDIA_TYPE.len())
            .any(|window| window == HTML_MEDIA_TYPE)
    })
}

/// Generate `ETag` from file metadata
///
/// Format is `"{mtime_secs_hex}-{size_hex}"`, or `"{size_hex}"` when the
/// modification time is unknown. Content is never read.
pub fn generate_etag(modified: Option<SystemTime>, size: u64) -> String {
    match modified.and_then(|t| t.duration_since(UNIX_EPOCH).ok()) {
        Some(since_epoch) => format!("\"{:x}-{size:x}\"", since_epoch.as_secs()),
        None => format!("\"{size:x}\""),
    }
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list and the `*` wildcard.
/// Comparison is weak: a `W/` prefix on either side is ignored.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let opaque: fn(&str) -> &str = |tag| tag.trim().trim_start_matches("W/");
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == "*" || opaque(e) == opaque(etag))
    })
}

/// Format a timestamp as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Check `If-Modified-Since` against the file's modification time.
///
/// Comparison is at one-second resolution, the precision of HTTP-dates.
/// Unparseable dates and unknown modification times never match.
pub fn check_not_modified_since(
    if_modified_since: Option<&str>,
    modified: Option<SystemTime>,
) -> bool {
    let (Some(since), Some(modified)) = (if_modified_since, modified) else {
        return false;
    };
    let Ok(since) = DateTime::parse_from_rfc2822(since.trim()) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
