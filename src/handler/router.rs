//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: strips the mount prefix, hands
//! the request to the file handler and writes the access log line.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{Request, Response, Uri};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| start_access_entry(&req, peer_addr));

    let response = match strip_prefix(req.uri(), state.mount_prefix()) {
        Some(Ok(uri)) => {
            let (mut parts, body) = req.into_parts();
            parts.uri = uri;
            let req = Request::from_parts(parts, body);
            let pending = state.files.serve(&req);
            pending.await
        }
        Some(Err(e)) => {
            logger::log_warning(&format!("Rejected request target: {e}"));
            http::build_400_response()
        }
        None => http::build_404_response(),
    };

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        logger::log_access(&entry);
    }

    Ok(response)
}

fn start_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        req.method().to_string(),
        req.uri().to_string(),
        format!("{:?}", req.version()),
    );
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

/// Remove the mount prefix from a request URI, keeping the query string.
///
/// Returns `None` when the path lies outside the prefix. The prefix only
/// matches on segment boundaries: `/static` covers `/static` and
/// `/static/app.js`, not `/staticfoo`.
pub fn strip_prefix(uri: &Uri, prefix: &str) -> Option<Result<Uri, hyper::http::uri::InvalidUri>> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(Ok(uri.clone()));
    }

    let rest = uri.path().strip_prefix(prefix)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }

    let path = if rest.is_empty() { "/" } else { rest };
    let target = match uri.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    };
    Some(target.parse())
}
