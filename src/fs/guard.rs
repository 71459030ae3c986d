//! Directory-listing guard
//!
//! Wraps a [`FileSystem`] so that no handle it returns can enumerate a
//! directory. Reads, seeks and stat calls pass through untouched.

use super::{File, FileInfo, FileSystem};
use std::future::{self, Future};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// Filesystem whose handles always report an empty directory listing
#[derive(Debug, Clone)]
pub struct GuardedFs<F> {
    inner: F,
}

impl<F: FileSystem> GuardedFs<F> {
    pub const fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: FileSystem> FileSystem for GuardedFs<F> {
    type File = GuardedFile<F::File>;

    async fn open(&self, name: &str) -> io::Result<Self::File> {
        // Errors pass through with their original kind
        let file = self.inner.open(name).await?;
        Ok(GuardedFile { inner: file })
    }
}

/// Handle returned by [`GuardedFs::open`]
#[derive(Debug)]
pub struct GuardedFile<T> {
    inner: T,
}

impl<T: File> AsyncRead for GuardedFile<T> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<T: File> AsyncSeek for GuardedFile<T> {
    fn start_seek(self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        Pin::new(&mut self.get_mut().inner).start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Pin::new(&mut self.get_mut().inner).poll_complete(cx)
    }
}

impl<T: File> File for GuardedFile<T> {
    fn stat(&self) -> impl Future<Output = io::Result<FileInfo>> + Send {
        self.inner.stat()
    }

    /// Always empty, whatever the entry is. The inner handle is never listed.
    fn read_dir(
        &mut self,
        _count: usize,
    ) -> impl Future<Output = io::Result<Vec<FileInfo>>> + Send {
        future::ready(Ok(Vec::new()))
    }
}
