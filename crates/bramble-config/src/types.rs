//! Configuration types.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Built-in defaults.
pub mod defaults {
    /// Default listen port.
    pub const DEFAULT_PORT: u16 = 9090;
    /// Default bind address.
    pub const DEFAULT_BIND: &str = "127.0.0.1";
    /// Per-request timeout in seconds.
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Directory uploaded files are written to.
    pub const UPLOAD_DIR: &str = "./tmp";
    /// Largest accepted upload body (32 MiB).
    pub const MAX_UPLOAD_BYTES: usize = 32 << 20;
    /// Session provider name.
    pub const SESSION_PROVIDER: &str = "memory";
    /// Session cookie name.
    pub const SESSION_COOKIE: &str = "gosessionid";
    /// Session idle lifetime in seconds.
    pub const SESSION_LIFETIME_SECS: u64 = 60;
}

// ─────────────────────────────────────────────────────────────────────────────
// Root Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration.
///
/// Maps to the full TOML config file. All sections are optional so that
/// partial configs (e.g., project-local overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrambleConfig {
    /// HTTP server configuration.
    pub server: Option<ServerSection>,

    /// Session configuration.
    pub session: Option<SessionSection>,

    /// Logging configuration.
    pub logging: Option<LoggingSection>,
}

impl BrambleConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: BrambleConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: BrambleConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerSection {
        self.server.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionSection {
        self.session.clone().unwrap_or_default()
    }

    /// Logging section, or defaults.
    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if let Some(server) = &self.server {
            server.socket_addr()?;
            if server.request_timeout_secs == 0 {
                return Err(invalid("server.request_timeout_secs", "must be at least 1"));
            }
        }
        if let Some(session) = &self.session {
            if session.provider.trim().is_empty() {
                return Err(invalid("session.provider", "must not be empty"));
            }
            if session.cookie_name.trim().is_empty() {
                return Err(invalid("session.cookie_name", "must not be empty"));
            }
            if session.max_lifetime_secs == 0 {
                return Err(invalid("session.max_lifetime_secs", "must be at least 1"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Enable request logging.
    pub request_logging: bool,
    /// Directory uploaded files are written to.
    pub upload_dir: PathBuf,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: defaults::DEFAULT_PORT,
            bind: defaults::DEFAULT_BIND.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            request_logging: true,
            upload_dir: PathBuf::from(defaults::UPLOAD_DIR),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerSection {
    /// Listen address built from `bind` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| invalid("server.bind", &format!("{}", e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Registered provider name.
    pub provider: String,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds.
    pub max_lifetime_secs: u64,
    /// Seconds between expiry sweeps. Defaults to the lifetime.
    pub gc_interval_secs: Option<u64>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            provider: defaults::SESSION_PROVIDER.to_string(),
            cookie_name: defaults::SESSION_COOKIE.to_string(),
            max_lifetime_secs: defaults::SESSION_LIFETIME_SECS,
            gc_interval_secs: None,
        }
    }
}

impl SessionSection {
    /// Session idle lifetime.
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    /// Explicit sweep interval, if configured.
    pub fn gc_interval(&self) -> Option<Duration> {
        self.gc_interval_secs.map(Duration::from_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[logging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Directory for the daily-rotated JSON log. No file log when unset.
    pub directory: Option<PathBuf>,
    /// `EnvFilter` directive overriding the console default.
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BrambleConfig::from_toml("").unwrap();

        let server = config.server();
        assert_eq!(server.port, 9090);
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:9090");
        assert_eq!(server.max_upload_bytes, 32 * 1024 * 1024);

        let session = config.session();
        assert_eq!(session.provider, "memory");
        assert_eq!(session.cookie_name, "gosessionid");
        assert_eq!(session.max_lifetime(), Duration::from_secs(60));
        assert_eq!(session.gc_interval(), None);
    }

    #[test]
    fn test_partial_section() {
        let config = BrambleConfig::from_toml(
            r#"
[session]
max_lifetime_secs = 600
gc_interval_secs = 30
"#,
        )
        .unwrap();

        let session = config.session();
        assert_eq!(session.cookie_name, "gosessionid");
        assert_eq!(session.max_lifetime(), Duration::from_secs(600));
        assert_eq!(session.gc_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_merge_overrides_sections() {
        let mut base = BrambleConfig::from_toml("[server]\nport = 1000\n").unwrap();
        let overlay =
            BrambleConfig::from_toml("[session]\ncookie_name = \"sid\"\n").unwrap();

        base.merge(overlay);

        assert_eq!(base.server().port, 1000);
        assert_eq!(base.session().cookie_name, "sid");
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let result = BrambleConfig::from_toml("[server]\nbind = \"not-an-ip\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "server.bind"));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let result = BrambleConfig::from_toml("[session]\nmax_lifetime_secs = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_parse_error() {
        let result = BrambleConfig::from_toml("[server\nport = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
