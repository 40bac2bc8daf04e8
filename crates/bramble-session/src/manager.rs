//! Session manager: cookie protocol and provider dispatch.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cookie::Cookie;
use http::HeaderMap;
use http::header::COOKIE;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::ManagerConfig;
use crate::error::Result;
use crate::id::generate_session_id;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;
use crate::session::SessionHandle;

/// Outcome of [`Manager::start`].
#[derive(Debug)]
pub struct SessionStart {
    /// The resolved or newly created session.
    pub session: SessionHandle,

    /// Cookie the response must set. Present only when a new session was
    /// created for a request that carried no session identity.
    pub set_cookie: Option<Cookie<'static>>,
}

impl SessionStart {
    /// Whether this call created the session.
    pub fn is_new(&self) -> bool {
        self.set_cookie.is_some()
    }
}

/// Resolves request cookies to sessions through a single provider.
///
/// The provider is chosen by name when the manager is built and never
/// changes afterwards. Identity resolution is serialized by the manager's
/// own lock, which is always taken before the provider's.
pub struct Manager {
    config: ManagerConfig,
    provider: Arc<dyn Provider>,
    lock: Mutex<()>,
}

impl Manager {
    /// Build a manager backed by the provider registered as `config.provider`.
    ///
    /// Fails with [`Error::UnknownProvider`](crate::Error::UnknownProvider)
    /// if no such provider is registered.
    pub fn new(registry: &ProviderRegistry, config: ManagerConfig) -> Result<Self> {
        let provider = registry.lookup(&config.provider)?;

        debug!(
            provider = %config.provider,
            cookie = %config.cookie_name,
            max_lifetime_secs = config.max_lifetime.as_secs(),
            "Session manager created"
        );

        Ok(Self {
            config,
            provider,
            lock: Mutex::new(()),
        })
    }

    /// Manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The provider backing this manager.
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Idle lifetime of sessions.
    pub fn max_lifetime(&self) -> Duration {
        self.config.max_lifetime
    }

    /// Resolve the request's session, creating one if it has none.
    ///
    /// Without a usable session cookie a new id is generated and the
    /// returned [`SessionStart::set_cookie`] must be sent with the response.
    /// With one, the provider's session for that id is returned (an id the
    /// provider no longer knows yields a fresh empty session under that id).
    pub fn start(&self, headers: &HeaderMap) -> Result<SessionStart> {
        let _guard = self.lock.lock();

        match self.session_id(headers) {
            Some(sid) => {
                let session = self.provider.read(&sid)?;
                trace!(session_id = %sid, "Session resumed");
                Ok(SessionStart {
                    session,
                    set_cookie: None,
                })
            }
            None => {
                let sid = generate_session_id()?;
                let session = self.provider.init(&sid)?;
                debug!(session_id = %sid, "New session started");
                Ok(SessionStart {
                    session,
                    set_cookie: Some(self.session_cookie(&sid)),
                })
            }
        }
    }

    /// Resolve the request's session without creating one.
    ///
    /// Returns `None` if the request carries no usable session cookie.
    pub fn fetch(&self, headers: &HeaderMap) -> Result<Option<SessionHandle>> {
        let _guard = self.lock.lock();

        match self.session_id(headers) {
            Some(sid) => Ok(Some(self.provider.read(&sid)?)),
            None => Ok(None),
        }
    }

    /// Destroy the request's session.
    ///
    /// Returns a cookie that clears the session cookie on the client, or
    /// `None` if the request carried no session.
    pub fn destroy(&self, headers: &HeaderMap) -> Option<Cookie<'static>> {
        let _guard = self.lock.lock();

        let sid = self.session_id(headers)?;
        self.provider.destroy(&sid);
        Some(self.removal_cookie())
    }

    /// Run one expiry sweep. Returns the number of sessions collected.
    pub fn gc(&self) -> usize {
        let _guard = self.lock.lock();
        self.provider.gc(self.config.max_lifetime)
    }

    /// The cookie that binds a client to `sid`.
    pub fn session_cookie(&self, sid: &str) -> Cookie<'static> {
        let max_age = i64::try_from(self.config.max_lifetime.as_secs()).unwrap_or(i64::MAX);

        Cookie::build((
            self.config.cookie_name.clone(),
            urlencoding::encode(sid).into_owned(),
        ))
        .path(self.config.cookie_path.clone())
        .http_only(true)
        .max_age(cookie::time::Duration::seconds(max_age))
        .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), String::new()))
            .path(self.config.cookie_path.clone())
            .http_only(true)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }

    /// Decoded session id from the request cookies, if present and usable.
    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        let raw = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(|parsed| parsed.ok())
            .find(|c| c.name() == self.config.cookie_name)?;

        let sid = urlencoding::decode(raw.value()).ok()?;
        if sid.is_empty() {
            return None;
        }
        Some(sid.into_owned())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("config", &self.config)
            .field("sessions", &self.provider.len())
            .finish()
    }
}
