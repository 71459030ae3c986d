//! Filesystem abstraction module
//!
//! Defines the file-access capability the static file server is written against:
//! - [`FileSystem`]: opens a path relative to some root
//! - [`File`]: an open handle that can be read, seeked, stat'ed and listed
//!
//! [`DirFs`] is the directory-backed implementation, [`GuardedFs`] wraps any
//! implementation and suppresses directory listings.

mod dir;
mod guard;

pub use dir::{clean_path, DirFile, DirFs};
pub use guard::{GuardedFile, GuardedFs};

use std::future::Future;
use std::io;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncSeek};

/// Metadata describing a file or directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the entry
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl FileInfo {
    pub fn from_metadata(name: String, metadata: &std::fs::Metadata) -> Self {
        Self {
            name,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        }
    }
}

/// A filesystem that can open paths relative to its root.
///
/// Errors from `open` carry the platform's classification (`NotFound`,
/// `PermissionDenied`, ...) so callers can map them to HTTP status codes.
pub trait FileSystem: Send + Sync {
    type File: File;

    /// Open `name`, a slash-separated path relative to the root
    fn open(&self, name: &str) -> impl Future<Output = io::Result<Self::File>> + Send;
}

/// An open file or directory handle
pub trait File: AsyncRead + AsyncSeek + Unpin + Send {
    /// Metadata of the opened entry
    fn stat(&self) -> impl Future<Output = io::Result<FileInfo>> + Send;

    /// Read directory entries.
    ///
    /// `count == 0` returns all remaining entries, otherwise at most `count`.
    /// An empty result means the listing is exhausted.
    fn read_dir(&mut self, count: usize)
        -> impl Future<Output = io::Result<Vec<FileInfo>>> + Send;
}
