//! HTTP response building module
//!
//! Builders for the responses the static file server produces. None of them
//! set `Cache-Control`; that header is owned by the caching layer on top.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    LOCATION,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

use super::range::ByteRange;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Validators and type information attached to every file response
#[derive(Debug, Clone, Copy)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

impl FileHeaders<'_> {
    fn apply(&self, builder: Builder) -> Builder {
        let builder = builder
            .header(CONTENT_TYPE, self.content_type)
            .header(ACCEPT_RANGES, "bytes")
            .header(ETAG, self.etag);
        match self.last_modified {
            Some(date) => builder.header(LAST_MODIFIED, date),
            None => builder,
        }
    }
}

/// Build 200 OK response carrying file content
///
/// `size` is the full file size; HEAD responses pass an empty `data`.
pub fn build_file_response(
    data: Bytes,
    size: u64,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    headers
        .apply(Response::builder().status(StatusCode::OK))
        .header(CONTENT_LENGTH, size)
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    headers: &FileHeaders<'_>,
    range: ByteRange,
    total_size: u64,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    headers
        .apply(Response::builder().status(StatusCode::PARTIAL_CONTENT))
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(total_size))
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("206", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(date) = last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }
    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 301 redirect, used to add the trailing slash to directory paths
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("Moved Permanently")))
        .unwrap_or_else(|e| fallback("301", &e))
}

/// Build HTML response, e.g. a directory listing
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = build_text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("416 Range Not Satisfiable")))
        .unwrap_or_else(|e| fallback("416", &e))
}

pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

pub fn build_403_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::FORBIDDEN, "403 Forbidden")
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build a plain-text status response
fn build_text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Log response build error and fall back to an empty response
fn fallback(status: &str, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    Response::new(Full::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: FileHeaders<'static> = FileHeaders {
        content_type: "text/css; charset=utf-8",
        etag: "\"abc\"",
        last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
    };

    #[test]
    fn test_file_response_headers() {
        let resp = build_file_response(Bytes::from_static(b"body{}"), 6, &HEADERS, false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "6");
        assert_eq!(resp.headers()[ETAG], "\"abc\"");
        assert_eq!(resp.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(resp.headers().get(hyper::header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_head_keeps_length() {
        let resp = build_file_response(Bytes::new(), 6, &HEADERS, true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "6");
    }

    #[test]
    fn test_partial_response() {
        let range = ByteRange { start: 2, end: 4 };
        let resp = build_partial_response(Bytes::from_static(b"dy{"), &HEADERS, range, 6, false);
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 2-4/6");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "3");
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(build_404_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(build_403_response().status(), StatusCode::FORBIDDEN);
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], ALLOWED_METHODS);
        assert_eq!(build_416_response(10).headers()[CONTENT_RANGE], "bytes */10");
    }
}
