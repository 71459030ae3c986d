//! Log writer module
//!
//! [`Logger`] is a cloneable, thread-safe sink that prefixes every line with a
//! local timestamp. The process-wide writer pairs one for access lines with
//! one for errors.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Log output target
#[derive(Debug)]
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
    /// Accepts and drops every line
    Discard,
}

/// Timestamped diagnostic sink
#[derive(Debug, Clone)]
pub struct Logger {
    target: Arc<LogTarget>,
}

impl Logger {
    fn with_target(target: LogTarget) -> Self {
        Self {
            target: Arc::new(target),
        }
    }

    pub fn stdout() -> Self {
        Self::with_target(LogTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::with_target(LogTarget::Stderr)
    }

    pub fn discard() -> Self {
        Self::with_target(LogTarget::Discard)
    }

    /// Append to `path`, creating it and its parent directories if needed
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = open_log_file(path.as_ref())?;
        Ok(Self::with_target(LogTarget::File(Mutex::new(file))))
    }

    /// Write one line, prefixed with the local time
    pub fn log(&self, message: &str) {
        if matches!(*self.target, LogTarget::Discard) {
            return;
        }
        let line = format!("{} {message}", Local::now().format(TIMESTAMP_FORMAT));
        match &*self.target {
            LogTarget::Stdout => println!("{line}"),
            LogTarget::Stderr => eprintln!("{line}"),
            LogTarget::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
            LogTarget::Discard => {}
        }
    }
}

/// Process-wide pair of sinks
#[derive(Debug, Clone)]
pub struct LogWriter {
    access: Logger,
    error: Logger,
}

impl LogWriter {
    /// Access lines go to stdout unless a file is given, errors to stderr
    pub fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => Logger::file(path)?,
            None => Logger::stdout(),
        };
        let error = match error_log_file {
            Some(path) => Logger::file(path)?,
            None => Logger::stderr(),
        };
        Ok(Self { access, error })
    }

    pub fn write_info(&self, message: &str) {
        self.access.log(message);
    }

    pub fn write_access(&self, message: &str) {
        self.access.log(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.log(message);
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self {
            access: Logger::stdout(),
            error: Logger::stderr(),
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Must run before the first log line; fails if the writer is already set.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, falling back to stdout/stderr before `init`
pub fn get() -> &'static LogWriter {
    LOG_WRITER.get_or_init(LogWriter::default)
}
