//! Static file serving module
//!
//! [`FileServer`] maps URL paths onto a [`FileSystem`] and produces complete
//! responses: index files, directory listings, conditional requests, byte
//! ranges and content types. It never sets `Cache-Control`.

use crate::fs::{File, FileInfo, FileSystem};
use crate::http::response::{self, FileHeaders};
use crate::http::{self, cache, mime, ByteRange, RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE};
use hyper::{Method, Request, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write;
use std::future::Future;
use std::io::{self, SeekFrom};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const INDEX_FILE: &str = "index.html";

/// Bytes escaped when a file name is put back into a URL
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Request information needed to serve a file, detached from the request body
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    /// Capture the request, percent-decoding its path.
    ///
    /// Returns `None` when the decoded path is not UTF-8 or contains a NUL.
    pub fn from_request<B>(req: &Request<B>) -> Option<Self> {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        let path = decode_path(req.uri().path())?;

        Some(Self {
            method: req.method().clone(),
            path,
            query: req.uri().query().map(ToString::to_string),
            if_none_match: header(IF_NONE_MATCH),
            if_modified_since: header(IF_MODIFIED_SINCE),
            range_header: header(RANGE),
        })
    }

    fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Relative redirect target, keeping the query string
    fn redirect_to(&self, target: &str) -> String {
        let target = utf8_percent_encode(target, SEGMENT);
        match &self.query {
            Some(q) => format!("{target}?{q}"),
            None => target.to_string(),
        }
    }
}

/// Generic static file server over any [`FileSystem`]
#[derive(Debug, Clone)]
pub struct FileServer<F> {
    fs: F,
}

impl<F: FileSystem> FileServer<F> {
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Serve a request.
    ///
    /// Everything needed is copied out of `req` up front, so the returned
    /// future only borrows the server.
    pub fn serve<B>(
        &self,
        req: &Request<B>,
    ) -> impl Future<Output = Response<Full<Bytes>>> + Send + '_ {
        let ctx = RequestContext::from_request(req);
        async move {
            match ctx {
                Some(ctx) => self.serve_context(&ctx).await,
                None => http::build_400_response(),
            }
        }
    }

    pub async fn serve_context(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        if let Some(resp) = check_http_method(&ctx.method) {
            return resp;
        }

        let path = ctx.path.as_str();
        let mut file = match self.fs.open(path).await {
            Ok(f) => f,
            Err(e) => return error_response(&e, path),
        };
        let info = match file.stat().await {
            Ok(i) => i,
            Err(e) => return error_response(&e, path),
        };

        if info.is_dir {
            if !path.ends_with('/') {
                return response::build_redirect_response(
                    &ctx.redirect_to(&format!("{}/", last_segment(path))),
                );
            }
            return self.serve_directory(ctx, &mut file).await;
        }

        if path.ends_with('/') {
            return response::build_redirect_response(
                &ctx.redirect_to(&format!("../{}", last_segment(path))),
            );
        }

        serve_content(ctx, path, file, &info).await
    }

    /// Serve `index.html` if present, otherwise the directory listing
    async fn serve_directory(
        &self,
        ctx: &RequestContext,
        dir: &mut F::File,
    ) -> Response<Full<Bytes>> {
        let index_path = format!("{}{INDEX_FILE}", ctx.path);
        if let Ok(index) = self.fs.open(&index_path).await {
            if let Ok(info) = index.stat().await {
                if !info.is_dir {
                    return serve_content(ctx, &index_path, index, &info).await;
                }
            }
        }

        let mut entries = match dir.read_dir(0).await {
            Ok(entries) => entries,
            Err(e) => {
                logger::log_error(&format!("Failed to list directory '{}': {e}", ctx.path));
                return http::build_500_response();
            }
        };

        // Nothing to show, or listing suppressed by the filesystem
        if entries.is_empty() {
            return http::build_404_response();
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        response::build_html_response(render_listing(&entries), ctx.is_head())
    }
}

/// Percent-decode a URL path and make it rooted.
///
/// `..` segments that were encoded (`%2e%2e`) come out as plain `..` and are
/// resolved later by the filesystem like any other.
fn decode_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }

    // Paths are always rooted, even after a mount prefix was stripped
    Some(if decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    })
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => Some(http::build_405_response()),
    }
}

/// Map a filesystem error onto a status response
fn error_response(err: &io::Error, path: &str) -> Response<Full<Bytes>> {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput => {
            http::build_404_response()
        }
        io::ErrorKind::PermissionDenied => http::build_403_response(),
        _ => {
            logger::log_error(&format!("Failed to open '{path}': {err}"));
            http::build_500_response()
        }
    }
}

/// Send a regular file, honoring conditional and range headers
async fn serve_content<T: File>(
    ctx: &RequestContext,
    name: &str,
    mut file: T,
    info: &FileInfo,
) -> Response<Full<Bytes>> {
    let size = info.size;
    let etag = cache::generate_etag(info.modified, size);
    let last_modified = info.modified.map(cache::http_date);
    let headers = FileHeaders {
        content_type: mime::content_type_for(name),
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };

    // If-Modified-Since is only consulted without If-None-Match
    let not_modified = match ctx.if_none_match.as_deref() {
        Some(_) => cache::check_etag_match(ctx.if_none_match.as_deref(), &etag),
        None => cache::check_not_modified_since(ctx.if_modified_since.as_deref(), info.modified),
    };
    if not_modified {
        return response::build_304_response(&etag, headers.last_modified);
    }

    let range = match http::parse_range_header(ctx.range_header.as_deref(), size) {
        RangeParseResult::Valid(range) => Some(range),
        RangeParseResult::NotSatisfiable => return response::build_416_response(size),
        RangeParseResult::None => None,
    };

    let data = if ctx.is_head() {
        Bytes::new()
    } else {
        match read_body(&mut file, range, size).await {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                logger::log_error(&format!("Failed to read '{name}': {e}"));
                return http::build_500_response();
            }
        }
    };

    match range {
        Some(range) => {
            response::build_partial_response(data, &headers, range, size, ctx.is_head())
        }
        None => response::build_file_response(data, size, &headers, ctx.is_head()),
    }
}

/// Read the whole file, or only `range` after seeking to its start
async fn read_body<T: File>(file: &mut T, range: Option<ByteRange>, size: u64) -> io::Result<Vec<u8>> {
    let (start, len) = range.map_or((0, size), |r| (r.start, r.len()));
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let mut data = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.take(len).read_to_end(&mut data).await?;
    Ok(data)
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Render directory entries as a minimal HTML page
fn render_listing(entries: &[FileInfo]) -> String {
    let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for entry in entries {
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let href = escape_html(&utf8_percent_encode(&name, SEGMENT).to_string());
        let _ = writeln!(html, "<a href=\"{href}\">{}</a>", escape_html(&name));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
