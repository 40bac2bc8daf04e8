//! Configuration for the session manager.

use std::time::Duration;

/// Provider selected when none is configured.
pub const DEFAULT_PROVIDER: &str = "memory";

/// Name of the cookie carrying the session id.
pub const DEFAULT_COOKIE_NAME: &str = "gosessionid";

/// Path attribute of the session cookie.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Idle lifetime after which a session is eligible for collection.
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(3600);

/// Lower bound for the sweep interval; a zero period would spin.
pub const MIN_GC_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Registry name of the provider backing this manager.
    pub provider: String,

    /// Cookie name used to carry the session id.
    pub cookie_name: String,

    /// Cookie `Path` attribute.
    pub cookie_path: String,

    /// Maximum idle time before a session is collected.
    /// Also used as the cookie `Max-Age`.
    pub max_lifetime: Duration,

    /// Interval between expiry sweeps. Defaults to `max_lifetime`.
    pub gc_interval: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            max_lifetime: DEFAULT_MAX_LIFETIME,
            gc_interval: None,
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the provider by registry name.
    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.provider = name.into();
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the session cookie path.
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set the idle lifetime of sessions.
    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set an explicit sweep interval.
    pub fn with_gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = Some(interval);
        self
    }

    /// Effective sweep interval.
    pub fn gc_interval(&self) -> Duration {
        self.gc_interval
            .unwrap_or(self.max_lifetime)
            .max(MIN_GC_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.provider, "memory");
        assert_eq!(config.cookie_name, "gosessionid");
        assert_eq!(config.cookie_path, "/");
        assert_eq!(config.gc_interval(), DEFAULT_MAX_LIFETIME);
    }

    #[test]
    fn test_gc_interval_follows_lifetime() {
        let config = ManagerConfig::new().with_max_lifetime(Duration::from_secs(60));
        assert_eq!(config.gc_interval(), Duration::from_secs(60));

        let config = config.with_gc_interval(Duration::from_secs(5));
        assert_eq!(config.gc_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_gc_interval_never_zero() {
        let config = ManagerConfig::new().with_max_lifetime(Duration::ZERO);
        assert_eq!(config.gc_interval(), MIN_GC_INTERVAL);
    }
}
