//! Static asset server
//!
//! Serves a document root over HTTP without ever disclosing directory
//! contents, and picks `Cache-Control` per request from the `Accept` header:
//! HTML navigations revalidate, every other fetch is cached for a year.
//!
//! ```no_run
//! use asset_server::handler::FileHandler;
//! use hyper::Request;
//!
//! # async fn demo() {
//! let files = FileHandler::new("dist/public");
//! let req = Request::builder().uri("/index.html").header("accept", "text/html").body(()).unwrap();
//! let resp = files.serve(&req).await;
//! assert_eq!(resp.headers()["cache-control"], "no-cache, no-store, must-revalidate");
//! # }
//! ```

pub mod config;
pub mod fs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
