//! Cache-aware file handler
//!
//! Serves a document root through [`GuardedFs`] and stamps every response
//! with a `Cache-Control` header chosen from the request's `Accept` header:
//! HTML navigations must revalidate, everything else is cached for a year.

use crate::fs::{DirFs, FileSystem, GuardedFs};
use crate::handler::file_server::FileServer;
use crate::http::CachePolicy;
use crate::logger::Logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL};
use hyper::{Request, Response};
use std::future::Future;
use std::path::PathBuf;

/// Static file handler with `Accept`-driven caching and no directory listings
#[derive(Debug, Clone)]
pub struct FileHandler<F = DirFs> {
    server: FileServer<GuardedFs<F>>,
    logger: Logger,
}

impl FileHandler<DirFs> {
    /// Serve files under `root`, logging to stderr
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(DirFs::new(root))
    }
}

impl<F: FileSystem> FileHandler<F> {
    /// Serve files from any filesystem; listings are still suppressed
    pub fn with_filesystem(fs: F) -> Self {
        Self {
            server: FileServer::new(GuardedFs::new(fs)),
            logger: Logger::stderr(),
        }
    }

    /// Replace the diagnostic sink
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Diagnostic sink for code composing this handler
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Handle one request.
    ///
    /// The cache policy depends only on the `Accept` headers and is decided
    /// before the file server runs. Whatever the file server answers (200,
    /// 304, 404, ...) leaves with exactly one `Cache-Control` header.
    pub fn serve<B>(
        &self,
        req: &Request<B>,
    ) -> impl Future<Output = Response<Full<Bytes>>> + Send + '_ {
        let policy = CachePolicy::from_headers(req.headers());
        let pending = self.server.serve(req);

        async move {
            let mut response = pending.await;
            response.headers_mut().insert(
                CACHE_CONTROL,
                HeaderValue::from_static(policy.header_value()),
            );
            response
        }
    }
}
