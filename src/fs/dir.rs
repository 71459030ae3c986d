//! Directory-backed filesystem
//!
//! Opens files beneath a root directory using `tokio::fs`.

use super::{File, FileInfo, FileSystem};
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// Filesystem rooted at a local directory
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path onto the local filesystem, confined to the root
    fn resolve(&self, name: &str) -> PathBuf {
        let cleaned = clean_path(name);
        if cleaned.is_empty() {
            self.root.clone()
        } else {
            self.root.join(cleaned)
        }
    }
}

impl FileSystem for DirFs {
    type File = DirFile;

    async fn open(&self, name: &str) -> io::Result<DirFile> {
        if name.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path contains NUL byte",
            ));
        }

        let path = self.resolve(name);
        let file = fs::File::open(&path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().into_owned());

        Ok(DirFile {
            file,
            path,
            name,
            entries: None,
        })
    }
}

/// Normalize a slash-separated path.
///
/// `.` segments are dropped and `..` pops the previous segment, never going
/// above the root. The result is relative and has no leading or trailing slash.
///
/// # Examples
/// ```
/// use asset_server::fs::clean_path;
/// assert_eq!(clean_path("/css/../js/./app.js"), "js/app.js");
/// assert_eq!(clean_path("/../../etc/passwd"), "etc/passwd");
/// assert_eq!(clean_path("/"), "");
/// ```
pub fn clean_path(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Handle returned by [`DirFs::open`]
#[derive(Debug)]
pub struct DirFile {
    file: fs::File,
    path: PathBuf,
    name: String,
    // Opened lazily on the first read_dir call
    entries: Option<fs::ReadDir>,
}

impl AsyncRead for DirFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

impl AsyncSeek for DirFile {
    fn start_seek(self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        Pin::new(&mut self.get_mut().file).start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Pin::new(&mut self.get_mut().file).poll_complete(cx)
    }
}

impl File for DirFile {
    async fn stat(&self) -> io::Result<FileInfo> {
        let metadata = self.file.metadata().await?;
        Ok(FileInfo::from_metadata(self.name.clone(), &metadata))
    }

    async fn read_dir(&mut self, count: usize) -> io::Result<Vec<FileInfo>> {
        if self.entries.is_none() {
            self.entries = Some(fs::read_dir(&self.path).await?);
        }
        let Some(entries) = self.entries.as_mut() else {
            return Ok(Vec::new());
        };

        let mut infos = Vec::new();
        while count == 0 || infos.len() < count {
            let Some(entry) = entries.next_entry().await? else {
                break;
            };
            let metadata = entry.metadata().await?;
            infos.push(FileInfo::from_metadata(
                entry.file_name().to_string_lossy().into_owned(),
                &metadata,
            ));
        }
        Ok(infos)
    }
}
