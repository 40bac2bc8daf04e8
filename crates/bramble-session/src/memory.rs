//! In-memory session provider with LRU-ordered expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::session::{Session, SessionHandle};

/// Registry name of the in-memory provider.
pub const MEMORY_PROVIDER: &str = "memory";

/// A stored session.
#[derive(Debug)]
struct Entry {
    last_accessed: DateTime<Utc>,
    attributes: HashMap<String, Value>,
}

impl Entry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_accessed: now,
            attributes: HashMap::new(),
        }
    }

    /// Refresh the access time. Never moves backwards.
    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }
}

/// State shared between the provider and every handle it gives out.
struct Store {
    /// Session index and recency order in one structure: front is the most
    /// recently used session, back is the next eviction candidate.
    sessions: Mutex<LruCache<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Run `f` against a live entry after touching it.
    fn access<R>(&self, sid: &str, f: impl FnOnce(&mut Entry) -> R) -> Option<R> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        // get_mut promotes the entry to the front.
        let entry = sessions.get_mut(sid)?;
        entry.touch(now);
        Some(f(entry))
    }

    fn insert(sessions: &mut LruCache<String, Entry>, sid: &str, now: DateTime<Utc>) {
        sessions.put(sid.to_string(), Entry::new(now));
    }
}

/// Sessions held in process memory.
///
/// Sessions live in an unbounded LRU list. Every attribute access moves a
/// session to the front, so the back of the list is always the globally
/// least recently used session and a sweep can stop at the first session
/// that has not yet expired.
#[derive(Clone)]
pub struct MemoryProvider {
    store: Arc<Store>,
}

impl MemoryProvider {
    /// Create an empty provider using the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty provider reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Store {
                sessions: Mutex::new(LruCache::unbounded()),
                clock,
            }),
        }
    }

    /// Live session ids, most recently used first.
    pub fn ids_by_recency(&self) -> Vec<String> {
        self.store
            .sessions
            .lock()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Last access time of `sid`, without counting as an access.
    pub fn last_accessed(&self, sid: &str) -> Option<DateTime<Utc>> {
        self.store
            .sessions
            .lock()
            .peek(sid)
            .map(|entry| entry.last_accessed)
    }

    /// Whether `sid` is live, without counting as an access.
    pub fn contains(&self, sid: &str) -> bool {
        self.store.sessions.lock().contains(sid)
    }

    fn handle(&self, sid: &str) -> SessionHandle {
        Arc::new(MemorySession {
            id: sid.to_string(),
            store: Arc::clone(&self.store),
        })
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("sessions", &self.len())
            .field("clock", &self.store.clock)
            .finish()
    }
}

impl Provider for MemoryProvider {
    fn init(&self, sid: &str) -> Result<SessionHandle> {
        let now = self.store.clock.now();
        let mut sessions = self.store.sessions.lock();

        if sessions.contains(sid) {
            return Err(Error::SessionExists(sid.to_string()));
        }
        Store::insert(&mut sessions, sid, now);

        trace!(session_id = %sid, live = sessions.len(), "Session created");
        drop(sessions);

        Ok(self.handle(sid))
    }

    fn read(&self, sid: &str) -> Result<SessionHandle> {
        let now = self.store.clock.now();
        let mut sessions = self.store.sessions.lock();

        if !sessions.contains(sid) {
            debug!(session_id = %sid, "Unknown session id, creating empty session");
            Store::insert(&mut sessions, sid, now);
        }
        drop(sessions);

        Ok(self.handle(sid))
    }

    fn destroy(&self, sid: &str) {
        if self.store.sessions.lock().pop(sid).is_some() {
            debug!(session_id = %sid, "Session destroyed");
        }
    }

    fn touch(&self, sid: &str) {
        self.store.access(sid, |_| ());
    }

    fn gc(&self, max_lifetime: Duration) -> usize {
        let max_idle = TimeDelta::from_std(max_lifetime).unwrap_or(TimeDelta::MAX);
        let now = self.store.clock.now();
        let mut sessions = self.store.sessions.lock();
        let mut evicted = 0;

        loop {
            let expired = match sessions.peek_lru() {
                Some((_, entry)) => now.signed_duration_since(entry.last_accessed) >= max_idle,
                None => false,
            };
            // Everything in front of a live entry was accessed more recently.
            if !expired {
                break;
            }
            if let Some((sid, _)) = sessions.pop_lru() {
                trace!(session_id = %sid, "Expired session collected");
                evicted += 1;
            }
        }

        if evicted > 0 {
            debug!(evicted, live = sessions.len(), "Collected expired sessions");
        }

        evicted
    }

    fn len(&self) -> usize {
        self.store.sessions.lock().len()
    }
}

/// Handle to a session owned by a [`MemoryProvider`].
///
/// Once the session has been destroyed or collected the handle reads as
/// empty and drops writes.
pub struct MemorySession {
    id: String,
    store: Arc<Store>,
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession").field("id", &self.id).finish()
    }
}

impl Session for MemorySession {
    fn set(&self, key: &str, value: Value) {
        let stored = self.store.access(&self.id, |entry| {
            entry.attributes.insert(key.to_string(), value);
        });
        if stored.is_none() {
            debug!(session_id = %self.id, key, "Write to a session that is no longer live dropped");
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.store
            .access(&self.id, |entry| entry.attributes.get(key).cloned())
            .flatten()
    }

    fn delete(&self, key: &str) {
        self.store.access(&self.id, |entry| {
            entry.attributes.remove(key);
        });
    }

    fn id(&self) -> &str {
        &self.id
    }
}
