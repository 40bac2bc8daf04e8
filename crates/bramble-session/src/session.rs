//! The per-client session handle.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A single client's session: a key/value bag addressed by an opaque id.
///
/// Every `get`, `set` and `delete` counts as an access: it refreshes the
/// session's last-access time and makes it the most recently used session
/// in its provider.
pub trait Session: Send + Sync + fmt::Debug {
    /// Insert or overwrite `key`.
    fn set(&self, key: &str, value: Value);

    /// Value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Remove `key` if present.
    fn delete(&self, key: &str);

    /// The session id.
    fn id(&self) -> &str;
}

/// Shared handle to a provider-owned session.
pub type SessionHandle = Arc<dyn Session>;
