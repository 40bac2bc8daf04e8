//! Application state shared across handlers.

use std::sync::Arc;

use bramble_session::Manager;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Session manager resolving request cookies to sessions.
    pub sessions: Arc<Manager>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ServerConfig, sessions: Arc<Manager>) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
