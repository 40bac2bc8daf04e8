//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default max upload body size (32 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

/// Default directory for uploaded files.
pub const DEFAULT_UPLOAD_DIR: &str = "./tmp";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Requests running longer than this are aborted.
    pub request_timeout: Duration,

    /// Enable request logging.
    pub request_logging: bool,

    /// Directory uploaded files are written to.
    pub upload_dir: PathBuf,

    /// Maximum upload request body size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9090)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_logging: true,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the upload directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set the maximum upload body size.
    pub fn with_max_upload_bytes(mut self, size: usize) -> Self {
        self.max_upload_bytes = size;
        self
    }
}
