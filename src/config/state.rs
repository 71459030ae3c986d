// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::handler::FileHandler;

/// Application state
pub struct AppState {
    pub config: Config,
    /// File handler mounted at `config.assets.mount_prefix`
    pub files: FileHandler,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            files: FileHandler::new(&config.assets.root),
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn mount_prefix(&self) -> &str {
        &self.config.assets.mount_prefix
    }
}
