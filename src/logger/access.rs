//! Access log entries in Combined Log Format

use chrono::{DateTime, Local};
use std::time::Instant;

/// One served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Request target including query string
    pub uri: String,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    started: Instant,
}

impl AccessLogEntry {
    /// Start an entry for a request arriving now
    pub fn new(remote_addr: String, method: String, uri: String, http_version: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version,
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            started: Instant::now(),
        }
    }

    /// Microseconds since the entry was created
    pub fn elapsed_us(&self) -> u128 {
        self.started.elapsed().as_micros()
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    pub fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\" {}us",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.http_version,
            self.status,
            self.body_bytes,
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
            self.elapsed_us(),
        )
    }
}
