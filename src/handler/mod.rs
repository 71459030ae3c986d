//! Request handler module
//!
//! - [`FileServer`]: generic static file server over a [`crate::fs::FileSystem`]
//! - [`FileHandler`]: the file server behind a listing guard, plus caching headers
//! - [`router`]: mounts the file handler at a URL prefix

mod cache_files;
pub mod file_server;
pub mod router;

pub use cache_files::FileHandler;
pub use file_server::{FileServer, RequestContext};
pub use router::handle_request;
