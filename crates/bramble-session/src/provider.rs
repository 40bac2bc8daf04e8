//! Session storage backends.

use std::time::Duration;

use crate::error::Result;
use crate::session::SessionHandle;

/// A storage strategy for sessions.
///
/// A provider exclusively owns its sessions; callers only ever hold
/// [`SessionHandle`]s. Implementations must serialize all mutations so the
/// session index and the expiry ordering are never observed out of step.
pub trait Provider: Send + Sync {
    /// Create an empty session under `sid`.
    ///
    /// Fails with [`Error::SessionExists`](crate::Error::SessionExists) if
    /// `sid` is already live.
    fn init(&self, sid: &str) -> Result<SessionHandle>;

    /// Return the session for `sid`.
    ///
    /// An unknown (or already collected) `sid` is not an error: a fresh,
    /// empty session is created under that id and returned.
    fn read(&self, sid: &str) -> Result<SessionHandle>;

    /// Remove `sid`. No-op if it is not live.
    fn destroy(&self, sid: &str);

    /// Mark `sid` as just accessed. No-op if it is not live.
    fn touch(&self, sid: &str);

    /// Remove every session idle for at least `max_lifetime`.
    ///
    /// Returns the number of sessions removed.
    fn gc(&self, max_lifetime: Duration) -> usize;

    /// Number of live sessions.
    fn len(&self) -> usize;

    /// Whether there are no live sessions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
