//! Server-side sessions identified by a cookie.
//!
//! This crate provides the session subsystem used by the Bramble server:
//! - [`Session`] handles exposing a per-client key/value bag
//! - A pluggable [`Provider`] abstraction with an in-memory implementation
//!   ([`MemoryProvider`]) that keeps sessions in most-recently-used order
//! - An explicit [`ProviderRegistry`] resolved once at startup
//! - A [`Manager`] that owns the cookie protocol and drives expiry sweeps
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use bramble_session::{Manager, ManagerConfig, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_builtin();
//! let config = ManagerConfig::new()
//!     .with_cookie_name("gosessionid")
//!     .with_max_lifetime(Duration::from_secs(60));
//!
//! let manager = Arc::new(Manager::new(&registry, config)?);
//! let gc = manager.spawn_gc();
//!
//! let started = manager.start(request.headers())?;
//! started.session.set("countnum", 1.into());
//! ```

mod clock;
mod config;
mod error;
mod gc;
mod id;
mod manager;
mod memory;
mod provider;
mod registry;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, DEFAULT_MAX_LIFETIME, DEFAULT_PROVIDER,
    ManagerConfig, MIN_GC_INTERVAL,
};
pub use error::{Error, Result};
pub use gc::GcTask;
pub use id::{SESSION_ID_BYTES, generate_session_id};
pub use manager::{Manager, SessionStart};
pub use memory::{MEMORY_PROVIDER, MemoryProvider, MemorySession};
pub use provider::Provider;
pub use registry::ProviderRegistry;
pub use session::{Session, SessionHandle};
